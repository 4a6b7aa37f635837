//! Synchronization Controller — the engine that owns the document.
//!
//! All writes funnel through the Mutator and Serializer; the caller never
//! splices text itself. Every write re-derives the touched block's
//! read-model from its new text, records the emission for provenance, and
//! schedules a commit of the right class. The engine owns no threads: the
//! caller polls for due commits with its own clock.

pub mod provenance;
pub mod schedule;
pub mod session;

use std::time::Instant;

pub use provenance::{Provenance, ProvenanceTracker};
pub use schedule::{CommitClass, CommitScheduler};
pub use session::{default_session_path, load_session, save_session, BlockState, Session};

use crate::document::{segment, serialize, Block, BlockId, BlockKind, NodeLayout};
use crate::param::{mutate, mutate_str, Edit, StrParam};

pub struct PatternEngine {
    text: String,
    preamble: String,
    bpm: Option<u32>,
    blocks: Vec<Block>,
    next_id: u64,
    provenance: ProvenanceTracker,
    scheduler: CommitScheduler,
}

impl PatternEngine {
    pub fn new(text: &str) -> Self {
        let mut engine = PatternEngine {
            text: text.to_string(),
            preamble: String::new(),
            bpm: None,
            blocks: Vec::new(),
            next_id: 0,
            provenance: ProvenanceTracker::new(),
            scheduler: CommitScheduler::new(),
        };
        engine.resegment();
        engine
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn bpm(&self) -> Option<u32> {
        self.bpm
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// Feed one inbound document change. Internal changes are our own
    /// emissions coming back and skip re-segmentation entirely; anything
    /// else re-segments with positional identity carry-forward.
    pub fn sync_document(&mut self, incoming: &str) -> Provenance {
        let provenance = self.provenance.classify(incoming);
        self.text = incoming.to_string();
        if provenance == Provenance::External {
            self.resegment();
        }
        provenance
    }

    fn resegment(&mut self) {
        let seg = segment(&self.text, &self.blocks, &mut self.next_id);
        self.preamble = seg.preamble;
        self.bpm = seg.bpm;
        self.blocks = seg.blocks;
    }

    /// Fast path for a drag in flight: update the visible reading only.
    /// No text changes, nothing is emitted or scheduled.
    pub fn preview_param(&mut self, id: BlockId, key: &str, value: f64) {
        if let Some(idx) = self.index_of(id) {
            if let Some(r) = self.blocks[idx]
                .readings
                .iter_mut()
                .find(|r| r.key == key && !r.dynamic)
            {
                r.value = value;
            }
        }
    }

    /// Commit path for a released knob. Returns false when the mutation was
    /// refused (dynamic target) or changed nothing.
    pub fn set_param(&mut self, id: BlockId, key: &str, value: f64, now: Instant) -> bool {
        self.mutate_block(id, |t| mutate(t, key, Edit::Set(value)), CommitClass::Debounced, now)
    }

    pub fn remove_param(&mut self, id: BlockId, key: &str, now: Instant) -> bool {
        self.mutate_block(id, |t| mutate(t, key, Edit::Remove), CommitClass::Debounced, now)
    }

    pub fn set_string(&mut self, id: BlockId, field: StrParam, value: &str, now: Instant) -> bool {
        self.mutate_block(id, |t| mutate_str(t, field, value), CommitClass::Debounced, now)
    }

    pub fn set_pattern(&mut self, id: BlockId, pattern: &str, now: Instant) -> bool {
        let field = match self.block(id).map(|b| b.kind) {
            Some(BlockKind::Drums) => StrParam::DrumPattern,
            Some(_) => StrParam::NotePattern,
            None => return false,
        };
        self.set_string(id, field, pattern, now)
    }

    pub fn set_sound_source(&mut self, id: BlockId, source: &str, now: Instant) -> bool {
        self.set_string(id, StrParam::SoundSource, source, now)
    }

    pub fn set_scale(&mut self, id: BlockId, scale: &str, now: Instant) -> bool {
        self.set_string(id, StrParam::Scale, scale, now)
    }

    /// Set one scale on every melodic block. Returns how many changed.
    pub fn set_scale_all(&mut self, scale: &str, now: Instant) -> usize {
        let ids: Vec<BlockId> = self
            .blocks
            .iter()
            .filter(|b| b.kind.is_melodic())
            .map(|b| b.id)
            .collect();
        ids.into_iter()
            .filter(|&id| self.set_scale(id, scale, now))
            .count()
    }

    pub fn toggle_bypass(&mut self, id: BlockId, now: Instant) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.blocks[idx].bypassed = !self.blocks[idx].bypassed;
        self.emit(CommitClass::Urgent, now);
        true
    }

    /// Exclusive solo: soloing one block clears every other solo; soloing
    /// the soloed block clears it. Audibility is a serialization overlay,
    /// stored bypass flags are untouched.
    pub fn toggle_solo(&mut self, id: BlockId, now: Instant) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let was_solo = self.blocks[idx].solo;
        for b in &mut self.blocks {
            b.solo = false;
        }
        if !was_solo {
            self.blocks[idx].solo = true;
        }
        self.emit(CommitClass::Urgent, now);
        true
    }

    pub fn reorder_block(&mut self, id: BlockId, new_index: usize, now: Instant) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let new_index = new_index.min(self.blocks.len() - 1);
        if new_index == idx {
            return false;
        }
        let block = self.blocks.remove(idx);
        self.blocks.insert(new_index, block);
        self.emit(CommitClass::Urgent, now);
        true
    }

    pub fn duplicate_block(&mut self, id: BlockId, now: Instant) -> Option<BlockId> {
        let idx = self.index_of(id)?;
        let mut copy = self.blocks[idx].clone();
        copy.id = BlockId(self.next_id);
        self.next_id += 1;
        copy.name = format!("{} copy", copy.name);
        copy.solo = false;
        copy.layout = NodeLayout::grid(self.blocks.len());
        let new_id = copy.id;
        self.blocks.insert(idx + 1, copy);
        self.emit(CommitClass::Urgent, now);
        Some(new_id)
    }

    pub fn delete_block(&mut self, id: BlockId, now: Instant) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.blocks.remove(idx);
        self.emit(CommitClass::Urgent, now);
        true
    }

    /// Append a fresh block from the per-kind starter template.
    pub fn add_block(&mut self, kind: BlockKind, now: Instant) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        let idx = self.blocks.len();
        let mut block = Block::new(id, format!("New {kind}"), template(kind).to_string(), idx);
        block.layout = NodeLayout::grid(idx);
        self.blocks.push(block);
        self.emit(CommitClass::Urgent, now);
        id
    }

    pub fn set_name(&mut self, id: BlockId, name: &str, now: Instant) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if self.blocks[idx].name == name {
            return false;
        }
        self.blocks[idx].name = name.to_string();
        self.emit(CommitClass::Urgent, now);
        true
    }

    pub fn set_layout(&mut self, id: BlockId, layout: NodeLayout) {
        if let Some(idx) = self.index_of(id) {
            // Layout lives outside the text; nothing to emit.
            self.blocks[idx].layout = layout;
        }
    }

    pub fn set_tempo(&mut self, bpm: u32, now: Instant) {
        self.bpm = Some(bpm);
        self.emit(CommitClass::Urgent, now);
    }

    /// The commit the renderer should receive now, if any is due.
    pub fn take_due_commit(&mut self, now: Instant) -> Option<(CommitClass, String)> {
        let class = self.scheduler.poll(now)?;
        Some((class, self.text.clone()))
    }

    pub fn next_commit_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Correlation id of the outstanding emission, for tagging outbound
    /// renderer messages. `None` once the emission has been classified back.
    pub fn last_emission_correlation(&self) -> Option<u64> {
        self.provenance.last_correlation()
    }

    pub fn capture_session(&self) -> Session {
        Session::capture(&self.blocks)
    }

    pub fn apply_session(&mut self, session: &Session) {
        session.apply(&mut self.blocks);
    }

    fn mutate_block(
        &mut self,
        id: BlockId,
        apply: impl FnOnce(&str) -> String,
        class: CommitClass,
        now: Instant,
    ) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let next = apply(&self.blocks[idx].text);
        if next == self.blocks[idx].text {
            return false;
        }
        self.blocks[idx].text = next;
        self.blocks[idx].refresh_read_model();
        self.emit(class, now);
        true
    }

    fn emit(&mut self, class: CommitClass, now: Instant) {
        self.text = serialize(&self.preamble, self.bpm, &self.blocks);
        self.provenance.record_emission(&self.text);
        self.scheduler.schedule(class, now);
    }
}

fn template(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Drums => {
            "$: s(\"bd [~ bd] ~ ~, ~ cp ~ ~, hh*8\")\n  .bank(\"RolandTR808\").gain(0.7)\n  .scope()"
        }
        BlockKind::Bass => {
            "$: note(\"<c2 f2 g2 c2>\")\n  .s(\"sine\").lpf(400).gain(0.35)\n  .scale(\"C4:major\")\n  .scope()"
        }
        BlockKind::Melody => {
            "$: n(\"0 2 4 7 4 2\").scale(\"C4:major\")\n  .s(\"gm_piano\").gain(0.3)\n  .room(0.4).delay(0.15)\n  .scope()"
        }
        BlockKind::Chords => {
            "$: note(\"<[c3,e3,g3] [a2,c3,e3] [f2,a2,c3] [g2,b2,d3]>\")\n  .s(\"gm_epiano1\").gain(0.25).scale(\"C4:major\")\n  .lpf(1800).room(0.5)\n  .slow(2)\n  .scope()"
        }
        BlockKind::Pad => {
            "$: note(\"<[c3,g3,e4] [a2,e3,c4]>\")\n  .s(\"sawtooth\").lpf(800).gain(0.08).scale(\"C4:major\")\n  .room(0.9).delay(0.3).delayfeedback(0.5)\n  .slow(4)\n  .fscope()"
        }
        BlockKind::Vocal => {
            "$: note(\"<c4 e4 g4>\")\n  .s(\"gm_voice_oohs\").gain(0.2).scale(\"C4:major\")\n  .room(0.7).vowel(\"a\")\n  .scope()"
        }
        BlockKind::Fx => {
            "$: s(\"hh*16\").gain(0.06)\n  .delay(0.25).delayfeedback(0.5)\n  .room(0.6).lpf(2000)\n  .scope()"
        }
        BlockKind::Other => "$: s(\"bd*4\").gain(0.5)\n  .scope()",
    }
}
