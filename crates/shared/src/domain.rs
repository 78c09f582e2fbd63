use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! name_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

name_newtype!(PageId);

impl PageId {
    pub const HOME: &'static str = "home";

    pub fn home() -> Self {
        Self::new(Self::HOME)
    }

    /// Page addressed by a location fragment; a leading `#` is ignored and an
    /// empty fragment means the home page.
    pub fn from_fragment(fragment: &str) -> Self {
        let id = fragment.strip_prefix('#').unwrap_or(fragment);
        if id.is_empty() {
            Self::home()
        } else {
            Self::new(id)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MocKind {
    Topic,
    Folder,
    Tag,
}

impl MocKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MocKind::Topic => "topic",
            MocKind::Folder => "folder",
            MocKind::Tag => "tag",
        }
    }
}

impl fmt::Display for MocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a map of content aggregates. Carrying the parameter inside the variant
/// keeps the kind and its value from disagreeing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MocTarget {
    Topic(String),
    Folder(String),
    Tag(String),
}

impl MocTarget {
    pub fn new(kind: MocKind, value: impl Into<String>) -> Self {
        let value = value.into();
        match kind {
            MocKind::Topic => MocTarget::Topic(value),
            MocKind::Folder => MocTarget::Folder(value),
            MocKind::Tag => MocTarget::Tag(value),
        }
    }

    pub fn kind(&self) -> MocKind {
        match self {
            MocTarget::Topic(_) => MocKind::Topic,
            MocTarget::Folder(_) => MocKind::Folder,
            MocTarget::Tag(_) => MocKind::Tag,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            MocTarget::Topic(value) | MocTarget::Folder(value) | MocTarget::Tag(value) => value,
        }
    }
}

/// Tags supplied by the user, either already split or as one comma separated string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn parse(raw: &str) -> Self {
        Self(raw.split(',').map(|tag| tag.trim().to_string()).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for TagList {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Vec<String>> for TagList {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}
