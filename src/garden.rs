//! Flower records as the page sees them: server rows merged with this
//! visitor's optimistic plantings, and their placement on the ground disk.

use garden_core::palette::format_hex_color;
use garden_core::{merge, FlowerRecord, GardenLayout, NewFlower, PlacedFlower, LOCAL_ID_PREFIX};

pub struct FlowerBed {
    layout: GardenLayout,
    limit: usize,
    pending: Vec<FlowerRecord>,
    confirmed: Vec<FlowerRecord>,
    user_id: Option<String>,
    next_local: u64,
    // newest first, as served
    records: Vec<FlowerRecord>,
    placed: Vec<PlacedFlower>,
}

impl FlowerBed {
    pub fn new(layout: GardenLayout, limit: usize, user_id: Option<String>) -> Self {
        Self {
            layout,
            limit: limit.max(1),
            pending: Vec::new(),
            confirmed: Vec::new(),
            user_id,
            next_local: 0,
            records: Vec::new(),
            placed: Vec::new(),
        }
    }

    pub fn records(&self) -> &[FlowerRecord] {
        &self.records
    }

    pub fn placed(&self) -> &[PlacedFlower] {
        &self.placed
    }

    pub fn record(&self, id: &str) -> Option<&FlowerRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn placed_flower(&self, id: &str) -> Option<&PlacedFlower> {
        self.placed.iter().find(|f| f.id == id)
    }

    /// Newest flower planted by this visitor.
    pub fn own_latest(&self) -> Option<&str> {
        let user = self.user_id.as_deref()?;
        self.records
            .iter()
            .find(|r| r.is_mine(Some(user)))
            .map(|r| r.id.as_str())
    }

    pub fn apply_snapshot(&mut self, rows: Vec<FlowerRecord>) {
        self.confirmed = rows;
        self.rebuild();
    }

    /// Adds a placeholder flower and returns its local id. The request body
    /// carries the placeholder's position and color so the confirmed row does
    /// not jump or change hue.
    pub fn push_optimistic(&mut self, body: &mut NewFlower, created_at: &str) -> String {
        self.next_local += 1;
        let id = format!("{LOCAL_ID_PREFIX}flower-{}", self.next_local);
        let mut record = FlowerRecord::new(id.clone());
        record.message = body.message.clone();
        record.color = body.color.clone();
        record.family = body.family.clone();
        record.user_id = body.user_id.clone();
        record.user_name = body.user_name.clone();
        record.created_at = created_at.to_string();
        record.wilted = Some(false);
        self.pending.push(record);
        self.rebuild();

        if let Some(p) = self.placed_flower(&id) {
            body.x = Some(p.position.x);
            body.y = Some(p.position.y);
            body.z = Some(p.position.z);
            if body.color.is_none() {
                body.color = Some(format_hex_color(p.color));
            }
        }
        if let Some(r) = self.pending.iter_mut().find(|r| r.id == id) {
            r.x = body.x;
            r.y = body.y;
            r.z = body.z;
            r.color = body.color.clone();
        }
        id
    }

    /// The server accepted a planting: the row replaces its placeholder.
    pub fn confirm(&mut self, local_id: &str, row: FlowerRecord) {
        self.pending.retain(|r| r.id != local_id);
        self.upsert(row);
    }

    pub fn discard_optimistic(&mut self, local_id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|r| r.id != local_id);
        let changed = self.pending.len() != before;
        if changed {
            self.rebuild();
        }
        changed
    }

    /// Insert or replace a server row (create, edit or revive response).
    pub fn upsert(&mut self, row: FlowerRecord) {
        match self.confirmed.iter_mut().find(|r| r.id == row.id) {
            Some(existing) => *existing = row,
            None => self.confirmed.insert(0, row),
        }
        self.rebuild();
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn rebuild(&mut self) {
        // Placeholders leave by id in `confirm`; matching them by logical key
        // would hide a second planting with the same (often empty) message.
        let mut merged = merge(&[], &self.confirmed, &self.pending);
        merged.truncate(self.limit);
        // Oldest first keeps existing flowers in their cells when new ones arrive.
        let oldest_first: Vec<FlowerRecord> = merged.iter().rev().cloned().collect();
        let mut placed = self.layout.place(&oldest_first, self.user_id.as_deref());
        placed.reverse();
        self.records = merged;
        self.placed = placed;
    }
}
