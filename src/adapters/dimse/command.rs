//! Argument lists for the query and transfer tools

use crate::config::DicomEndpointConfig;
use crate::core::audit::events::PeerEndpoint;
use crate::core::window::BatchWindow;
use crate::domain::ids::AeTitle;
use crate::domain::tag::DicomTag;

/// Query/retrieve level used for every request
pub const QUERY_RETRIEVE_LEVEL: &str = "STUDY";

/// The two ends of an association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub calling: AeTitle,
    pub called: AeTitle,
    pub host: String,
    pub port: u16,
}

impl Association {
    /// Build from the calling and called network entities
    pub fn from_endpoints(caller: &DicomEndpointConfig, callee: &DicomEndpointConfig) -> Self {
        Self {
            calling: caller.aet.clone(),
            called: callee.aet.clone(),
            host: callee.host.clone(),
            port: callee.port,
        }
    }

    /// Identity recorded in audit rows
    pub fn peer_endpoint(&self) -> PeerEndpoint {
        PeerEndpoint {
            caller_id: self.calling.to_string(),
            callee_id: self.called.to_string(),
            peer_host: self.host.clone(),
            peer_port: self.port,
        }
    }

    fn push_connection_args(&self, args: &mut Vec<String>) {
        args.extend([
            "-aet".to_string(),
            self.calling.to_string(),
            "-aec".to_string(),
            self.called.to_string(),
            self.host.clone(),
            self.port.to_string(),
        ]);
    }
}

fn push_key(args: &mut Vec<String>, key: String) {
    args.push("-k".to_string());
    args.push(key);
}

/// Arguments for a study-level query of one category over a window
///
/// Each return tag is requested with an empty value so the archive sends it
/// back without constraining the match.
pub fn find_args(
    association: &Association,
    window: &BatchWindow,
    category: &str,
    return_tags: &[DicomTag],
) -> Vec<String> {
    let mut args = vec!["-v".to_string(), "-S".to_string()];
    association.push_connection_args(&mut args);
    push_key(&mut args, format!("QueryRetrieveLevel={QUERY_RETRIEVE_LEVEL}"));
    push_key(&mut args, format!("StudyDate={}", window.format_token()));
    push_key(&mut args, format!("ModalitiesInStudy={category}"));
    for tag in return_tags {
        push_key(&mut args, format!("{tag}="));
    }
    args
}

/// Arguments for a study-level transfer of one study
pub fn move_args(
    association: &Association,
    move_destination: Option<&AeTitle>,
    study_instance_uid: &str,
) -> Vec<String> {
    let mut args = vec!["-v".to_string()];
    association.push_connection_args(&mut args);
    if let Some(destination) = move_destination {
        args.push("-aem".to_string());
        args.push(destination.to_string());
    }
    push_key(&mut args, format!("QueryRetrieveLevel={QUERY_RETRIEVE_LEVEL}"));
    push_key(&mut args, format!("StudyInstanceUID={study_instance_uid}"));
    args
}
