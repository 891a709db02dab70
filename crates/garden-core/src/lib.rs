pub mod camera_rig;
pub mod constants;
pub mod error;
pub mod layout;
pub mod mesh;
pub mod palette;
pub mod pins;
pub mod reconcile;
pub mod records;
pub mod rng;
pub mod scheduler;
pub mod state;
pub mod text;
pub mod timeline;

pub use camera_rig::*;
pub use error::*;
pub use layout::*;
pub use pins::*;
pub use reconcile::*;
pub use records::*;
pub use rng::*;
pub use scheduler::*;
pub use state::*;
pub use timeline::*;
