use crate::types::{ServiceGroup, ServiceMapping};
use std::collections::HashMap;

/// Service mappings bucketed by application-service name.
///
/// Groups iterate in first-seen order; mappings within a group keep row
/// encounter order.
#[derive(Debug, Default)]
pub struct GroupedResult {
    positions: HashMap<String, usize>,
    groups: Vec<ServiceGroup>,
    mapping_count: usize,
}

impl GroupedResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, application_service_name: &str, mapping: ServiceMapping) {
        self.mapping_count += 1;
        match self.positions.get(application_service_name) {
            Some(&i) => self.groups[i].service_mappings.push(mapping),
            None => {
                self.positions
                    .insert(application_service_name.to_string(), self.groups.len());
                self.groups.push(ServiceGroup {
                    application_service_name: application_service_name.to_string(),
                    service_mappings: vec![mapping],
                });
            }
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn mapping_count(&self) -> usize {
        self.mapping_count
    }

    pub fn groups(&self) -> &[ServiceGroup] {
        &self.groups
    }

    /// Flattens into the output document.
    pub fn into_document(self) -> Vec<ServiceGroup> {
        self.groups
    }
}
