//! Shared identifier types.

use uuid::Uuid;

pub type UserId = Uuid;
pub type ChirpId = Uuid;
