//! Backend implementation for the static policy plugin.

use async_trait::async_trait;
use eligibility_sdk::{BindingQuery, CandidateBinding, PolicyBackend, PolicyBackendError};

use super::service::Service;
use crate::config::PolicyMode;

#[async_trait]
impl PolicyBackend for Service {
    async fn find_candidate_bindings(
        &self,
        query: &BindingQuery,
    ) -> Result<Vec<CandidateBinding>, PolicyBackendError> {
        match self.mode() {
            PolicyMode::Configured => Ok(self.find(query)),
            PolicyMode::Unavailable => Err(PolicyBackendError::Unavailable(
                "static policy backend is configured as unavailable".to_owned(),
            )),
        }
    }
}
