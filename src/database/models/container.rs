use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::tenant::TenantId;

/// The orderable parents that share one ordering implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Prep board; items are prep columns.
    Board,
    /// Website page; items are content blocks.
    Page,
    /// Navigation menu; items are navigation entries.
    Menu,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Board => "board",
            ContainerKind::Page => "page",
            ContainerKind::Menu => "menu",
        }
    }

    /// Parse the plural route segment (`boards`, `pages`, `menus`).
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "boards" => Some(ContainerKind::Board),
            "pages" => Some(ContainerKind::Page),
            "menus" => Some(ContainerKind::Menu),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "board" => Ok(ContainerKind::Board),
            "page" => Ok(ContainerKind::Page),
            "menu" => Ok(ContainerKind::Menu),
            other => Err(format!("unknown container kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub owner_id: Uuid,
    pub kind: ContainerKind,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContainer {
    pub tenant_id: TenantId,
    pub owner_id: Uuid,
    pub kind: ContainerKind,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_and_names_agree() {
        for kind in [ContainerKind::Board, ContainerKind::Page, ContainerKind::Menu] {
            let segment = format!("{}s", kind.as_str());
            assert_eq!(ContainerKind::from_segment(&segment), Some(kind));
            assert_eq!(kind.as_str().parse::<ContainerKind>(), Ok(kind));
        }
        assert_eq!(ContainerKind::from_segment("columns"), None);
    }
}
