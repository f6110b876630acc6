// Container characteristics, recomputed synchronously before every setup

use crate::host::{Bounds, MountRef, MountTarget, Node, NodeKind};

/// Geometry and typography of the mount target at setup time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerMetrics {
    pub bounds: Bounds,
    pub font_em: f64,
    pub scrollbar_width: f64,
}

impl ContainerMetrics {
    /// Measure the target synchronously
    pub fn measure(target: &MountRef) -> Self {
        Self {
            bounds: target.bounds(),
            font_em: target.font_em(),
            scrollbar_width: measure_scrollbar_width(target),
        }
    }
}

/// Empirically measure the native scrollbar width of the target's host
///
/// The native scrollbar width differs by platform and cannot be queried
/// directly, so we insert a probe child sized to force overflow, diff its
/// outer width against its content width, and discard the probe. Pure
/// function of the target's environment; leaves no residue.
pub fn measure_scrollbar_width(target: &MountRef) -> f64 {
    let probe = target.append_child(
        Node::new(NodeKind::Probe)
            // Positioned off-screen so the transient insertion never shows
            .with_bounds(Bounds::new(-10_000.0, -10_000.0, 100.0, 100.0)),
    );
    let outer = target.node_outer_width(probe);
    let content = target.node_content_width(probe);
    target.remove_child(probe);
    (outer - content).max(0.0)
}
