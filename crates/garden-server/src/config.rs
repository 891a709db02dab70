use crate::store::WritePolicy;
use chrono::Duration;
use garden_core::constants::WILT_AFTER_HOURS;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Runtime configuration; every flag has an environment fallback.
#[derive(Parser, Debug, Clone)]
#[command(name = "garden-server", version, about = "Garden rows over HTTP")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "GARDEN_HTTP_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// JSON file mirroring every row; rows live only in memory when unset.
    #[arg(long, env = "GARDEN_DATA_PATH")]
    pub data_path: Option<PathBuf>,

    #[arg(
        long,
        env = "GARDEN_OWNER_ONLY_UPDATES",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub owner_only_updates: bool,

    #[arg(
        long,
        env = "GARDEN_MESSAGES_READ_ONLY",
        default_value_t = false,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub messages_read_only: bool,

    /// Hours without a revive before a flower is served wilted; 0 turns wilting off.
    #[arg(
        long,
        env = "GARDEN_WILT_AFTER_HOURS",
        default_value_t = WILT_AFTER_HOURS,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub wilt_after_hours: i64,
}

impl ServerConfig {
    pub fn policy(&self) -> WritePolicy {
        WritePolicy {
            owner_only_updates: self.owner_only_updates,
            messages_read_only: self.messages_read_only,
        }
    }

    pub fn wilt_after(&self) -> Option<Duration> {
        (self.wilt_after_hours > 0).then(|| Duration::hours(self.wilt_after_hours))
    }
}
