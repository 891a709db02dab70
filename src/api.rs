//! REST client for the garden server.

use crate::constants::{API_FLOWERS, API_MESSAGES};
use garden_core::{
    ErrorEnvelope, FlowerEnvelope, FlowerPatch, FlowerRecord, FlowersEnvelope, MessageEnvelope,
    MessageRecord, MessagesEnvelope, NewFlower, NewMessage,
};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{what}: {message}")]
    Network { what: &'static str, message: String },
    /// The server answered with a non-2xx status and an error envelope.
    #[error("{what}: HTTP {status}: {message}")]
    Rejected {
        what: &'static str,
        status: u16,
        message: String,
    },
    #[error("{what}: bad response body: {message}")]
    Decode { what: &'static str, message: String },
}

impl ClientError {
    /// 4xx answers mean the request itself was refused; retrying or going
    /// offline will not help.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if (400..500).contains(status))
    }
}

fn network(what: &'static str) -> impl FnOnce(gloo_net::Error) -> ClientError {
    move |e| ClientError::Network {
        what,
        message: e.to_string(),
    }
}

/// Shared teardown flag; futures check it before touching app state.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Rc<Cell<bool>>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

async fn decode<T: DeserializeOwned>(what: &'static str, res: Response) -> Result<T, ClientError> {
    if res.ok() {
        return res.json::<T>().await.map_err(|e| ClientError::Decode {
            what,
            message: e.to_string(),
        });
    }
    let status = res.status();
    let message = match res.json::<ErrorEnvelope>().await {
        Ok(env) => env.error,
        Err(_) => res.status_text(),
    };
    Err(ClientError::Rejected {
        what,
        status,
        message,
    })
}

pub async fn fetch_flowers() -> Result<Vec<FlowerRecord>, ClientError> {
    let res = Request::get(API_FLOWERS)
        .send()
        .await
        .map_err(network("GET /api/flowers"))?;
    let env: FlowersEnvelope = decode("GET /api/flowers", res).await?;
    Ok(env.flowers)
}

pub async fn plant_flower(body: &NewFlower) -> Result<FlowerRecord, ClientError> {
    let res = Request::post(API_FLOWERS)
        .json(body)
        .map_err(network("POST /api/flowers"))?
        .send()
        .await
        .map_err(network("POST /api/flowers"))?;
    let env: FlowerEnvelope = decode("POST /api/flowers", res).await?;
    Ok(env.flower)
}

pub async fn update_flower(id: &str, patch: &FlowerPatch) -> Result<FlowerRecord, ClientError> {
    let url = format!("{API_FLOWERS}/{id}");
    let res = Request::patch(&url)
        .json(patch)
        .map_err(network("PATCH /api/flowers/{id}"))?
        .send()
        .await
        .map_err(network("PATCH /api/flowers/{id}"))?;
    let env: FlowerEnvelope = decode("PATCH /api/flowers/{id}", res).await?;
    Ok(env.flower)
}

pub async fn revive_flower(id: &str, user_id: &str) -> Result<FlowerRecord, ClientError> {
    let url = format!("{API_FLOWERS}/{id}/revive");
    let body = FlowerPatch {
        message: None,
        user_id: Some(user_id.to_string()),
    };
    let res = Request::post(&url)
        .json(&body)
        .map_err(network("POST /api/flowers/{id}/revive"))?
        .send()
        .await
        .map_err(network("POST /api/flowers/{id}/revive"))?;
    let env: FlowerEnvelope = decode("POST /api/flowers/{id}/revive", res).await?;
    Ok(env.flower)
}

pub async fn fetch_messages(limit: usize) -> Result<Vec<MessageRecord>, ClientError> {
    let url = format!("{API_MESSAGES}?limit={limit}");
    let res = Request::get(&url)
        .send()
        .await
        .map_err(network("GET /api/messages"))?;
    let env: MessagesEnvelope = decode("GET /api/messages", res).await?;
    Ok(env.messages)
}

pub async fn post_message(body: &NewMessage) -> Result<MessageRecord, ClientError> {
    let res = Request::post(API_MESSAGES)
        .json(body)
        .map_err(network("POST /api/messages"))?
        .send()
        .await
        .map_err(network("POST /api/messages"))?;
    let env: MessageEnvelope = decode("POST /api/messages", res).await?;
    Ok(env.message)
}
