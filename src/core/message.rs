//! Chat messages as seen by the rendering core.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
    Error,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "you",
            Self::Assistant => "assistant",
            Self::Error => "error",
        }
    }
}

/// Optional display hints carried alongside a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageMeta {
    pub agent: Option<String>,
    pub model: Option<String>,
    /// True while the assistant turn that owns this message is still streaming.
    pub streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub meta: MessageMeta,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            meta: MessageMeta::default(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Role::Error, content)
    }

    pub fn with_meta(mut self, meta: MessageMeta) -> Self {
        self.meta = meta;
        self
    }
}
