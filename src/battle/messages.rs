use tracing::trace;

/// Paged battle text. The engine appends lines and moves the reveal limit;
/// presentation shows the revealed prefix and reports clicks.
#[derive(Debug, Clone, Default)]
pub struct MessageSequencer {
    lines: Vec<String>,
    line_limit: usize,
    frozen: bool,
    click_enabled: bool,
    click_pending: bool,
    /// Bumped whenever lines are dropped, so observers can tell a fresh page
    /// from a longer one.
    generation: u64,
}

impl MessageSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every line but keeps the reveal limit and click state.
    pub fn clear_messages(&mut self) {
        self.lines.clear();
        self.generation += 1;
    }

    pub fn add_message(&mut self, text: impl Into<String>) {
        let text = text.into();
        trace!(line = self.lines.len(), %text, "message");
        self.lines.push(text);
    }

    pub fn set_line_limit(&mut self, limit: usize) {
        self.line_limit = limit;
    }

    pub fn line_limit(&self) -> usize {
        self.line_limit
    }

    /// Reveals one more line. False once everything is shown.
    pub fn reveal_next(&mut self) -> bool {
        if self.all_revealed() {
            return false;
        }
        self.line_limit += 1;
        true
    }

    pub fn show_all(&mut self) {
        self.line_limit = self.lines.len();
    }

    pub fn all_revealed(&self) -> bool {
        self.line_limit >= self.lines.len()
    }

    /// Back to an empty, unrevealed, unclickable window.
    pub fn reset(&mut self) {
        self.clear_messages();
        self.line_limit = 0;
        self.click_enabled = false;
        self.click_pending = false;
    }

    pub fn freeze(&mut self, frozen: bool) {
        self.frozen = frozen;
        if frozen {
            self.click_pending = false;
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_enable_click(&mut self, enabled: bool) {
        self.click_enabled = enabled;
        if !enabled {
            self.click_pending = false;
        }
    }

    pub fn is_click_enabled(&self) -> bool {
        self.click_enabled
    }

    /// Input side: the player pressed the decide key. Ignored unless
    /// clicking is enabled and the window is live.
    pub fn click(&mut self) {
        if self.click_enabled && !self.frozen {
            self.click_pending = true;
        }
    }

    /// Edge-triggered: true once per accepted click.
    pub fn clicked(&mut self) -> bool {
        std::mem::take(&mut self.click_pending)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn messages(&self) -> &[String] {
        &self.lines
    }

    /// The lines currently shown, in append order.
    pub fn revealed(&self) -> &[String] {
        &self.lines[..self.line_limit.min(self.lines.len())]
    }
}
