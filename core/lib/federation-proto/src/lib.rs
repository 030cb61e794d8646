//! Generated protobuf/tonic types for the federation `Fetch` RPC (C9/C10,
//! §4.7–§4.8, §6). `federation-out` implements [`federation::federation_server::Federation`];
//! `federation-in` calls [`federation::federation_client::FederationClient`].

pub mod federation {
    tonic::include_proto!("tekx.federation");
}

pub use federation::{
    federation_client::FederationClient,
    federation_server::{Federation, FederationServer},
    ContactTracingInfo, ContactTracingResponse, ExposureKey, FederationFetchRequest,
    FederationFetchResponse,
};
