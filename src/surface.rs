use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    RateChecking,
    Busy,
    Success,
    Failure,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Validating => "validating",
            Phase::RateChecking => "rate-checking",
            Phase::Busy => "busy",
            Phase::Success => "success",
            Phase::Failure => "failure",
        };
        f.write_str(name)
    }
}

// each write replaces the previous content
pub trait OutputSurface: Send {
    fn write(&mut self, text: &str);

    fn enter(&mut self, _phase: Phase) {}

    fn clear(&mut self) {
        self.write("");
    }
}

#[derive(Debug, Default, Clone)]
pub struct BufferSurface {
    pub text: String,
    pub writes: Vec<String>,
    pub phases: Vec<Phase>,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phases.last().copied().unwrap_or(Phase::Idle)
    }
}

impl OutputSurface for BufferSurface {
    fn write(&mut self, text: &str) {
        self.text = text.to_string();
        self.writes.push(text.to_string());
    }

    fn enter(&mut self, phase: Phase) {
        self.phases.push(phase);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Greeting,
    User,
    Assistant,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    /// Trusted markup from the assistant, inserted as-is.
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub body: Body,
}

impl ChatMessage {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            body: Body::Text(text.into()),
        }
    }

    pub fn html(role: Role, html: impl Into<String>) -> Self {
        Self {
            role,
            body: Body::Html(html.into()),
        }
    }

    pub fn content(&self) -> &str {
        match &self.body {
            Body::Text(s) | Body::Html(s) => s,
        }
    }
}

pub trait ChatView: Send {
    fn append(&mut self, message: ChatMessage);

    fn show_thinking(&mut self);

    fn hide_thinking(&mut self);

    fn set_input_enabled(&mut self, enabled: bool);
}

#[derive(Debug, Clone)]
pub struct BufferChatView {
    pub messages: Vec<ChatMessage>,
    pub thinking: bool,
    pub input_enabled: bool,
    /// Every `set_input_enabled` call, in order.
    pub input_toggles: Vec<bool>,
}

impl Default for BufferChatView {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            thinking: false,
            input_enabled: true,
            input_toggles: Vec::new(),
        }
    }
}

impl BufferChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

impl ChatView for BufferChatView {
    fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    fn show_thinking(&mut self) {
        self.thinking = true;
    }

    fn hide_thinking(&mut self) {
        self.thinking = false;
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.input_toggles.push(enabled);
    }
}
