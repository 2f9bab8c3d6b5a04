//! Composers wiring plans and tool records into target graphs.
//!
//! Every composer is a pure function of its inputs. Nothing runs until the
//! returned targets are handed to a [`Resolver`](crate::resolve::Resolver).

pub mod bitstream;
pub mod bsp;
pub mod layout;
pub mod rtl;
pub mod sim;

pub use bitstream::BitstreamOutputs;
pub use bsp::BspOutputs;
pub use layout::{BspLayout, FpgaLayout, RtlLayout, SimLayout};
pub use rtl::RtlOutputs;
pub use sim::{SimOutputs, SimulationRequest};
