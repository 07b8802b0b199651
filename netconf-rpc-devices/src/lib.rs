//! Simulated devices built on `netconf-rpc`.
//!
//! Each module carries one YANG model as a [`Module`], the typed input and
//! output of its operations, an `async_trait` for the business logic, a
//! `...Server` that registers that logic with a [`DeviceBuilder`] and an
//! in-memory simulator:
//!
//! - [`data_center`]: `server` list entries with `reset` and `start` actions.
//! - [`toaster`]: `make-toast`, `cancel-toast` and the `toastDone`
//!   notification.
//! - [`topology`]: `remove-node-from-topology`.
//!
//! [`simulation`] wires all three into one device.
//!
//! [`Module`]: netconf_rpc::schema::Module
//! [`DeviceBuilder`]: netconf_rpc::DeviceBuilder
#![warn(
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod data_center;
pub mod toaster;
pub mod topology;

use data_center::{DataCenterServer, SimulatedDataCenter};
use netconf_rpc::schema::SchemaContext;
use netconf_rpc::{Device, RegistrationError};
use std::sync::Arc;
use toaster::{SimulatedToaster, ToasterServer};
use topology::{NetworkTopologyServer, SimulatedTopology};

/// The schema of every simulated model.
pub fn schema() -> SchemaContext {
    SchemaContext::new()
        .with_module(data_center::module())
        .with_module(toaster::module())
        .with_module(topology::module())
}

/// A device serving every simulated model, with handles on the simulators
/// that keep state.
#[derive(Clone, Debug)]
pub struct Simulation {
    /// The device.
    pub device: Device,
    /// The toaster behind `make-toast` and `cancel-toast`.
    pub toaster: Arc<SimulatedToaster>,
    /// The topologies behind `remove-node-from-topology`.
    pub topology: Arc<SimulatedTopology>,
}

/// Build a [`Simulation`].
pub fn simulation() -> Result<Simulation, RegistrationError> {
    let builder = Device::builder(Arc::new(schema()));

    let toaster = Arc::new(SimulatedToaster::new(builder.notifications().clone()));
    let topology = Arc::new(SimulatedTopology::new());

    let builder = DataCenterServer::new(SimulatedDataCenter::new()).register(builder);
    let builder = ToasterServer::from_arc(toaster.clone()).register(builder);
    let builder = NetworkTopologyServer::from_arc(topology.clone()).register(builder);

    Ok(Simulation {
        device: builder.build()?,
        toaster,
        topology,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_is_registered() {
        let simulation = simulation().unwrap();
        assert_eq!(simulation.device.router().descriptors().count(), 5);
    }
}
