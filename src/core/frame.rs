use super::reconciler::ReconcileStats;

/// Outcome of one viewport pump - what the timeline UI syncs against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Render frames submitted so far, including this one
    pub number: u64,
    /// Playback steps applied during this pump
    pub playback_ticks: u32,
    /// Timeline frame after this pump
    pub current_frame: u32,
    /// Whether a frame was drawn
    pub rendered: bool,
    /// Structural sync performed before drawing, if the object list changed
    pub reconciled: Option<ReconcileStats>,
    /// Nodes whose transform was re-evaluated
    pub animated_nodes: usize,
}
