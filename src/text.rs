//! Message control codes: parsing, expansion and visible length.
//!
//! Supported codes (case-insensitive): `\\` backslash, `\C[n]` color,
//! `\S[n]` speed, `\N[n]` character name (`0` is the party leader), `\V[n]`
//! variable, `\$` money window, `\!` wait for key, `\.` `\|` waits, `\>` `\<`
//! instant display on/off and `\_` half-width space.

use crate::project::ProjectData;
use crate::save::SaveState;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Color(u32),
    Speed(u32),
    CharacterName(u32),
    Variable(u32),
    Money,
    WaitForKey,
    ShortWait,
    LongWait,
    InstantOn,
    InstantOff,
    HalfSpace,
}

/// Splits a message into literal text and control codes. Malformed codes
/// are kept as literal text.
pub fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            literal.push(c);
            continue;
        }
        let Some(code) = chars.next() else {
            literal.push('\\');
            break;
        };
        let simple = match code {
            '\\' => {
                literal.push('\\');
                continue;
            }
            '$' => Some(Segment::Money),
            '!' => Some(Segment::WaitForKey),
            '.' => Some(Segment::ShortWait),
            '|' => Some(Segment::LongWait),
            '>' => Some(Segment::InstantOn),
            '<' => Some(Segment::InstantOff),
            '_' => Some(Segment::HalfSpace),
            _ => None,
        };
        if let Some(segment) = simple {
            flush(&mut literal, &mut segments);
            segments.push(segment);
            continue;
        }

        let make: Option<fn(u32) -> Segment> = match code.to_ascii_lowercase() {
            'c' => Some(Segment::Color as fn(u32) -> Segment),
            's' => Some(Segment::Speed as fn(u32) -> Segment),
            'n' => Some(Segment::CharacterName as fn(u32) -> Segment),
            'v' => Some(Segment::Variable as fn(u32) -> Segment),
            _ => None,
        };
        let argument = make.and_then(|make| {
            let mut lookahead = chars.clone();
            if lookahead.next() != Some('[') {
                return None;
            }
            let mut digits = String::new();
            for d in lookahead.by_ref() {
                if d == ']' {
                    let value = digits.parse().ok()?;
                    return Some((make(value), digits.len() + 2));
                }
                digits.push(d);
            }
            None
        });
        match argument {
            Some((segment, consumed)) => {
                for _ in 0..consumed {
                    chars.next();
                }
                flush(&mut literal, &mut segments);
                segments.push(segment);
            }
            None => {
                literal.push('\\');
                literal.push(code);
            }
        }
    }
    flush(&mut literal, &mut segments);
    segments
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Text(std::mem::take(literal)));
    }
}

/// Resolves control codes against the current save. Formatting codes are
/// dropped, substitutions are filled in.
pub fn expand(text: &str, project: &ProjectData, save: &SaveState) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in parse(text) {
        match segment {
            Segment::Text(literal) => out.push_str(&literal),
            Segment::CharacterName(id) => out.push_str(&character_name(id, project, save)),
            Segment::Variable(id) => out.push_str(&save.variable(id).to_string()),
            Segment::HalfSpace => out.push(' '),
            Segment::Money
            | Segment::Color(_)
            | Segment::Speed(_)
            | Segment::WaitForKey
            | Segment::ShortWait
            | Segment::LongWait
            | Segment::InstantOn
            | Segment::InstantOff => {}
        }
    }
    out
}

/// Number of characters a text window shows for `text` after expansion.
pub fn visible_length(text: &str, project: &ProjectData, save: &SaveState) -> usize {
    expand(text, project, save).chars().count()
}

fn character_name(id: u32, project: &ProjectData, save: &SaveState) -> String {
    let char_id = if id == 0 {
        match save.party().first() {
            Some(leader) => *leader,
            None => return String::new(),
        }
    } else {
        id
    };
    match project.character(char_id).and_then(|c| c.name()) {
        Ok(name) => name.to_string(),
        Err(err) => {
            warn!(%err, "unknown character in \\N code");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::Array1D;
    use schema::fields::character;

    fn context() -> (ProjectData, SaveState) {
        let mut project = ProjectData::default();
        let params = vec![10, 5, 5, 5, 5, 5];
        project.characters.insert(
            1,
            Array1D::new()
                .with(character::NAME, "Alex")
                .with(character::PARAMETERS, params.clone()),
        );
        project.characters.insert(
            2,
            Array1D::new()
                .with(character::NAME, "Brian")
                .with(character::PARAMETERS, params),
        );
        let mut save = SaveState::new();
        save.set_variable(5, 1200);
        (project, save)
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("\\N[2] joined!", "Brian joined!")]
    #[case("\\n[1]\\_and\\_\\N[2]", "Alex and Brian")]
    #[case("Score: \\V[5]", "Score: 1200")]
    #[case("\\C[3]red\\C[0] text\\!", "red text")]
    #[case("a\\\\b", "a\\b")]
    #[case("wait\\.\\|\\>fast\\<", "waitfast")]
    #[case("\\N[x] stays", "\\N[x] stays")]
    #[case("dangling\\", "dangling\\")]
    fn test_expand(#[case] input: &str, #[case] expected: &str) {
        let (project, save) = context();

        assert_eq!(expand(input, &project, &save), expected);
    }

    #[test]
    fn test_leader_name_and_visible_length() {
        let (project, mut save) = context();
        save.add_party_member(&project, 2).unwrap();

        assert_eq!(expand("\\N[0]", &project, &save), "Brian");
        assert_eq!(visible_length("\\C[1]\\N[0]!\\$", &project, &save), 6);
    }

    #[test]
    fn test_parse_segments() {
        assert_eq!(
            parse("Hi \\V[12]\\$"),
            vec![
                Segment::Text("Hi ".to_string()),
                Segment::Variable(12),
                Segment::Money,
            ]
        );
    }
}
