//! Row types shared by the server, the REST client and the layout engine.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One row of the `flowers` table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowerRecord {
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub revived_at: Option<String>,
    #[serde(default)]
    pub wilted: Option<bool>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub z: Option<f32>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
}

impl FlowerRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Stored coordinates, only when all three are present and finite.
    pub fn stored_position(&self) -> Option<Vec3> {
        match (self.x, self.y, self.z) {
            (Some(x), Some(y), Some(z)) if x.is_finite() && y.is_finite() && z.is_finite() => {
                Some(Vec3::new(x, y, z))
            }
            _ => None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.wilted.unwrap_or(false)
    }

    pub fn is_mine(&self, local_user_id: Option<&str>) -> bool {
        match (self.user_id.as_deref(), local_user_id) {
            (Some(owner), Some(local)) => owner == local,
            _ => false,
        }
    }
}

/// One row of the `messages` table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// `{ok, flowers}` list envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowersEnvelope {
    pub ok: bool,
    #[serde(default)]
    pub flowers: Vec<FlowerRecord>,
}

/// `{ok, flower}` single-row envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowerEnvelope {
    pub ok: bool,
    pub flower: FlowerRecord,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessagesEnvelope {
    pub ok: bool,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub ok: bool,
    pub message: MessageRecord,
}

/// `{ok:false, error}` envelope returned for every failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: String,
}

/// Body of `POST /api/flowers`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewFlower {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub z: Option<f32>,
}

/// Body of `PATCH /api/flowers/{id}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FlowerPatch {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Body of `POST /api/messages`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}
