// Capability composition protocol
//
// A capability is a pure function from a boxed view chain to an extended
// chain: `attach(base, config) -> Box<dyn View>`. Each wrapper calls the
// inner hooks explicitly (an ordered pipeline, never a merge), ORs its tag
// into the chain's capability set, and may append its own resource
// descriptors. Attach functions are idempotent: when the chain already
// carries the tag, the base is returned unchanged - double-wrapping would
// mean duplicate overlays and duplicate event subscriptions.
//
// The tag set answers "is this entity wrapped by capability X anywhere in
// its chain?" without knowledge of construction order.

pub mod animated;
pub mod empty_state;
pub mod fixed_size;
pub mod loading;
pub mod modal;

pub use animated::AnimatedConfig;
pub use empty_state::EmptyStateConfig;
pub use fixed_size::FixedSizeConfig;
pub use loading::LoadingConfig;
pub use modal::{ModalButton, ModalConfig};

use bitflags::bitflags;

bitflags! {
    /// Capability tags carried by a composed view chain
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        const LOADING     = 1 << 0;
        const EMPTY_STATE = 1 << 1;
        const ANIMATED    = 1 << 2;
        const FIXED_SIZE  = 1 << 3;
        const MODAL       = 1 << 4;
    }
}
