//! DICOM network tool integration
//!
//! Query (C-FIND) and transfer (C-MOVE) requests are delegated to external
//! command-line tools. This module builds their argument lists and runs them.

pub mod command;
pub mod invoker;

pub use command::{find_args, move_args, Association, QUERY_RETRIEVE_LEVEL};
pub use invoker::{InvocationOutcome, InvocationStatus, ProcessInvoker, ProtocolInvoker};
