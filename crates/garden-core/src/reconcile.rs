//! Merging optimistic local inserts with server lists and realtime inserts.

use crate::records::{FlowerRecord, MessageRecord};
use crate::text::collapse_whitespace;
use fnv::{FnvHashMap, FnvHashSet};

/// Prefix of ids minted for optimistic placeholders before the server answers.
pub const LOCAL_ID_PREFIX: &str = "local-";

pub trait Reconcile: Clone {
    fn id(&self) -> &str;
    /// Identity of the logical item independent of its id.
    fn logical_key(&self) -> String;
    fn created_at(&self) -> &str;
}

impl Reconcile for MessageRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn logical_key(&self) -> String {
        format!(
            "{}\u{1f}{}",
            self.user_id.as_deref().unwrap_or(""),
            collapse_whitespace(&self.text)
        )
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

impl Reconcile for FlowerRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn logical_key(&self) -> String {
        format!(
            "{}\u{1f}{}",
            self.user_id.as_deref().unwrap_or(""),
            collapse_whitespace(self.message.as_deref().unwrap_or(""))
        )
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

/// Authoritative records win over placeholders; the result is newest first.
///
/// `incoming` overrides `confirmed` on id collisions. Each authoritative record
/// absorbs at most one placeholder with the same logical key, and only one
/// created no later than itself.
pub fn merge<T: Reconcile>(local_optimistic: &[T], confirmed: &[T], incoming: &[T]) -> Vec<T> {
    let mut order: Vec<String> = Vec::with_capacity(confirmed.len() + incoming.len());
    let mut by_id: FnvHashMap<String, T> = FnvHashMap::default();
    for record in confirmed.iter().chain(incoming.iter()) {
        if by_id.insert(record.id().to_string(), record.clone()).is_none() {
            order.push(record.id().to_string());
        }
    }
    let mut authoritative: Vec<T> = order
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();

    // per logical key, creation times of authoritative rows not yet matched
    let mut unclaimed: FnvHashMap<String, Vec<&str>> = FnvHashMap::default();
    let ids: FnvHashSet<&str> = authoritative.iter().map(|r| r.id()).collect();
    for record in &authoritative {
        unclaimed
            .entry(record.logical_key())
            .or_default()
            .push(record.created_at());
    }
    for times in unclaimed.values_mut() {
        times.sort_unstable();
    }
    let mut placeholders: Vec<&T> = local_optimistic
        .iter()
        .filter(|p| !ids.contains(p.id()))
        .collect();
    placeholders.sort_by(|a, b| a.created_at().cmp(b.created_at()));
    // A row written before the placeholder is an earlier send of the same text.
    let survivors: Vec<T> = placeholders
        .into_iter()
        .filter(|p| {
            let Some(times) = unclaimed.get_mut(&p.logical_key()) else {
                return true;
            };
            match times.iter().position(|t| *t >= p.created_at()) {
                Some(i) => {
                    times.remove(i);
                    false
                }
                None => true,
            }
        })
        .cloned()
        .collect();

    authoritative.extend(survivors);
    // RFC 3339 timestamps from one source sort lexicographically
    authoritative.sort_by(|a, b| b.created_at().cmp(a.created_at()));
    authoritative
}

/// Stateful message list fed by REST snapshots, realtime inserts and local sends.
#[derive(Clone, Debug)]
pub struct MessageFeed {
    limit: usize,
    pending: Vec<MessageRecord>,
    confirmed: Vec<MessageRecord>,
    incoming: Vec<MessageRecord>,
    next_local: u64,
}

impl MessageFeed {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            pending: Vec::new(),
            confirmed: Vec::new(),
            incoming: Vec::new(),
            next_local: 0,
        }
    }

    /// Adds a placeholder and returns its local id.
    pub fn push_optimistic(
        &mut self,
        text: &str,
        user_id: Option<&str>,
        user_name: Option<&str>,
        created_at: &str,
    ) -> String {
        self.next_local += 1;
        let id = format!("{LOCAL_ID_PREFIX}{}", self.next_local);
        self.pending.push(MessageRecord {
            id: id.clone(),
            text: collapse_whitespace(text),
            user_id: user_id.map(str::to_string),
            user_name: user_name.map(str::to_string),
            created_at: created_at.to_string(),
        });
        id
    }

    /// Drops a placeholder whose send failed.
    pub fn discard_optimistic(&mut self, local_id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|m| m.id != local_id);
        self.pending.len() != before
    }

    /// The server answered this visitor's own send: the row replaces its
    /// placeholder whatever the two clocks say.
    pub fn confirm(&mut self, local_id: &str, row: MessageRecord) {
        self.pending.retain(|m| m.id != local_id);
        self.apply_realtime(row);
    }

    /// Replace the confirmed list with a fresh server snapshot.
    pub fn apply_snapshot(&mut self, rows: Vec<MessageRecord>) {
        self.confirmed = rows;
        self.incoming.clear();
        self.compact();
    }

    /// A server-confirmed insert (realtime push or POST response).
    pub fn apply_realtime(&mut self, row: MessageRecord) {
        self.incoming.retain(|m| m.id != row.id);
        self.incoming.push(row);
        self.compact();
    }

    pub fn records(&self) -> Vec<MessageRecord> {
        let mut merged = merge(&self.pending, &self.confirmed, &self.incoming);
        merged.truncate(self.limit);
        merged
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    // Forget placeholders the authoritative lists already cover.
    fn compact(&mut self) {
        let merged = merge(&self.pending, &self.confirmed, &self.incoming);
        let alive: FnvHashSet<&str> = merged
            .iter()
            .filter(|m| is_local_id(&m.id))
            .map(|m| m.id.as_str())
            .collect();
        self.pending.retain(|m| alive.contains(m.id.as_str()));
    }
}

impl Default for MessageFeed {
    fn default() -> Self {
        Self::new(crate::constants::MESSAGES_DEFAULT_LIMIT)
    }
}
