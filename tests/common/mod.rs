//! In-memory object store for reconcile tests
//!
//! Records every call, enforces resourceVersion on status writes and lets a
//! test queue one-shot failures per operation.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use definition_controller::controller::store::{ObjectKey, ObjectStore, StoreError};
use definition_controller::crd::{
    CopyMethod, ReplicationSource, ReplicationSourceDefinition, ReplicationSourceDefinitionSpec,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    GetDefinition,
    GetSource,
    CreateSource,
    PatchSource,
    UpdateStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetDefinition(ObjectKey),
    GetSource(ObjectKey),
    CreateSource(ObjectKey),
    PatchSource(ObjectKey, Value),
    UpdateStatus(ObjectKey),
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Call::CreateSource(_) | Call::PatchSource(..) | Call::UpdateStatus(_)
        )
    }

    pub fn is_source_write(&self) -> bool {
        matches!(self, Call::CreateSource(_) | Call::PatchSource(..))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    definitions: Mutex<BTreeMap<ObjectKey, ReplicationSourceDefinition>>,
    sources: Mutex<BTreeMap<ObjectKey, ReplicationSource>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Vec<(Op, StoreError)>>,
    next_version: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self) -> String {
        (self.next_version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    /// Store a definition as a user would create it: uid, generation and resourceVersion assigned
    pub fn insert_definition(&self, mut definition: ReplicationSourceDefinition) -> ObjectKey {
        let key = ObjectKey::from_resource(&definition);
        let mut definitions = self.definitions.lock().unwrap();
        let previous = definitions.get(&key);

        if definition.metadata.uid.is_none() {
            definition.metadata.uid = Some(
                previous
                    .and_then(|d| d.metadata.uid.clone())
                    .unwrap_or_else(|| format!("uid-{}", key.name)),
            );
        }
        let spec_changed = previous.is_none_or(|d| d.spec != definition.spec);
        let generation = previous.and_then(|d| d.metadata.generation).unwrap_or(0);
        definition.metadata.generation = Some(if spec_changed { generation + 1 } else { generation });
        if definition.status.is_none() {
            definition.status = previous.and_then(|d| d.status.clone());
        }
        definition.metadata.resource_version = Some(self.bump());

        definitions.insert(key.clone(), definition);
        key
    }

    /// Change a stored definition's spec, bumping its generation
    pub fn update_definition_spec(
        &self,
        key: &ObjectKey,
        update: impl FnOnce(&mut ReplicationSourceDefinitionSpec),
    ) {
        let mut definition = self.definition(key).expect("definition must exist");
        update(&mut definition.spec);
        self.insert_definition(definition);
    }

    pub fn insert_source(&self, mut source: ReplicationSource) -> ObjectKey {
        let key = ObjectKey::from_resource(&source);
        source.metadata.resource_version = Some(self.bump());
        source
            .metadata
            .uid
            .get_or_insert_with(|| format!("uid-{}", key.name));
        self.sources.lock().unwrap().insert(key.clone(), source);
        key
    }

    pub fn definition(&self, key: &ObjectKey) -> Option<ReplicationSourceDefinition> {
        self.definitions.lock().unwrap().get(key).cloned()
    }

    pub fn source(&self, key: &ObjectKey) -> Option<ReplicationSource> {
        self.sources.lock().unwrap().get(key).cloned()
    }

    pub fn source_count(&self) -> usize {
        self.sources.lock().unwrap().len()
    }

    /// Make the next call of `op` fail with `error`
    pub fn fail_next(&self, op: Op, error: StoreError) {
        self.failures.lock().unwrap().push((op, error));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(&self, op: Op) -> Result<(), StoreError> {
        let mut failures = self.failures.lock().unwrap();
        match failures.iter().position(|(o, _)| *o == op) {
            Some(index) => Err(failures.remove(index).1),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_definition(
        &self,
        key: &ObjectKey,
    ) -> Result<Option<ReplicationSourceDefinition>, StoreError> {
        self.record(Call::GetDefinition(key.clone()));
        self.injected(Op::GetDefinition)?;
        Ok(self.definition(key))
    }

    async fn get_source(&self, key: &ObjectKey) -> Result<Option<ReplicationSource>, StoreError> {
        self.record(Call::GetSource(key.clone()));
        self.injected(Op::GetSource)?;
        Ok(self.source(key))
    }

    async fn create_source(
        &self,
        source: &ReplicationSource,
    ) -> Result<ReplicationSource, StoreError> {
        let key = ObjectKey::from_resource(source);
        self.record(Call::CreateSource(key.clone()));
        self.injected(Op::CreateSource)?;

        if self.source(&key).is_some() {
            return Err(StoreError::AlreadyExists {
                kind: "ReplicationSource",
                key,
            });
        }
        self.insert_source(source.clone());
        Ok(self.source(&key).expect("just inserted"))
    }

    async fn patch_source(
        &self,
        key: &ObjectKey,
        patch: &Value,
    ) -> Result<ReplicationSource, StoreError> {
        self.record(Call::PatchSource(key.clone(), patch.clone()));
        self.injected(Op::PatchSource)?;

        let current = self.source(key).ok_or_else(|| StoreError::NotFound {
            kind: "ReplicationSource",
            key: key.clone(),
        })?;
        let mut document = serde_json::to_value(&current).expect("source serializes");
        apply_merge_patch(&mut document, patch);
        let patched: ReplicationSource = serde_json::from_value(document).map_err(|e| {
            StoreError::Write {
                kind: "ReplicationSource",
                key: key.clone(),
                message: e.to_string(),
            }
        })?;
        self.insert_source(patched);
        Ok(self.source(key).expect("just patched"))
    }

    async fn update_definition_status(
        &self,
        definition: &ReplicationSourceDefinition,
    ) -> Result<(), StoreError> {
        let key = ObjectKey::from_resource(definition);
        self.record(Call::UpdateStatus(key.clone()));
        self.injected(Op::UpdateStatus)?;

        let version = self.bump();
        let mut definitions = self.definitions.lock().unwrap();
        let stored = definitions.get_mut(&key).ok_or_else(|| StoreError::NotFound {
            kind: "ReplicationSourceDefinition",
            key: key.clone(),
        })?;
        if definition.metadata.resource_version.is_some()
            && definition.metadata.resource_version != stored.metadata.resource_version
        {
            return Err(StoreError::Conflict {
                kind: "ReplicationSourceDefinition",
                key,
                message: "the object has been modified; please apply your changes to the latest version and try again".to_string(),
            });
        }
        stored.status = definition.status.clone();
        stored.metadata.resource_version = Some(version);
        Ok(())
    }
}

/// RFC 7386 merge patch
pub fn apply_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                apply_merge_patch(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

pub fn rclone_definition(
    namespace: &str,
    name: &str,
    copy_method: Option<CopyMethod>,
) -> ReplicationSourceDefinition {
    let mut definition = ReplicationSourceDefinition::new(
        name,
        ReplicationSourceDefinitionSpec {
            replication_method: "rclone".to_string(),
            source_pvc: Some("data".to_string()),
            rclone_config_section: Some("s3-backup".to_string()),
            rclone_dest_path: Some(format!("backups/{}", name)),
            rclone_config: Some("rclone-secret".to_string()),
            copy_method,
        },
    );
    definition.metadata.namespace = Some(namespace.to_string());
    definition
}
