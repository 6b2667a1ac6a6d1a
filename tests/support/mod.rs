// ABOUTME: Test support utilities.
// ABOUTME: Fakes for the platform ports and a harness wiring the full stack.

// Each test binary only uses part of this module.
#![allow(dead_code)]

use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;

use eikona::catalog::CatalogService;
use eikona::config::ServiceConfig;
use eikona::lifecycle::LifecycleManager;
use eikona::model::{ImageFilter, ImageStatus, Library};
use eikona::platform::{
    AccessChecker, Capability, DirectoryError, FilterStore, InstanceError, InstanceRecord,
    InstanceState, InstanceStore, ProjectDirectory, SettingsError, UserContext,
};
use eikona::provisioning::{CaptureSpec, GatewayError, ProvisioningGateway};
use eikona::sharing::SharingEngine;
use eikona::store::{ImageStore, MemoryImageStore, MemoryRoleStore};
use eikona::types::{ImageKey, ImageName, InstanceId, TrackingId};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("eikona=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn user(name: &str) -> UserContext {
    UserContext::new(name, &format!("token-{}", name))
}

pub fn image_name(value: &str) -> ImageName {
    ImageName::new(value).unwrap()
}

pub fn library(name: &str) -> Library {
    Library {
        group: "pip3".to_string(),
        name: name.to_string(),
        version: "1.0".to_string(),
        scope: eikona::model::LibraryScope::Environment,
        resource: None,
    }
}

pub fn compute_library(name: &str, resource: &str) -> Library {
    Library {
        group: "pip3".to_string(),
        name: name.to_string(),
        version: "1.0".to_string(),
        scope: eikona::model::LibraryScope::Compute,
        resource: Some(resource.to_string()),
    }
}

type InstanceKey = (String, String, String);

fn instance_key(user: &str, project: &str, name: &str) -> InstanceKey {
    (user.to_string(), project.to_string(), name.to_string())
}

/// Instance store fake with seedable records and library snapshots.
#[derive(Default)]
pub struct FakeInstances {
    records: RwLock<HashMap<InstanceKey, InstanceRecord>>,
    libraries: RwLock<HashMap<InstanceKey, Vec<Library>>>,
}

impl FakeInstances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, record: InstanceRecord) {
        let key = instance_key(&record.user, &record.project, &record.name);
        self.records.write().insert(key, record);
    }

    pub fn set_libraries(&self, user: &str, project: &str, name: &str, libraries: Vec<Library>) {
        self.libraries
            .write()
            .insert(instance_key(user, project, name), libraries);
    }

    pub fn state_of(&self, user: &str, project: &str, name: &str) -> Option<InstanceState> {
        self.records
            .read()
            .get(&instance_key(user, project, name))
            .map(|record| record.state)
    }

    pub fn address_of(&self, user: &str, project: &str, name: &str) -> Option<String> {
        self.records
            .read()
            .get(&instance_key(user, project, name))
            .and_then(|record| record.address.clone())
    }

    fn lookup(
        &self,
        user: &str,
        project: &str,
        name: &str,
    ) -> Result<InstanceRecord, InstanceError> {
        self.records
            .read()
            .get(&instance_key(user, project, name))
            .cloned()
            .ok_or_else(|| InstanceError::NotFound {
                user: user.to_string(),
                project: project.to_string(),
                name: name.to_string(),
            })
    }
}

#[async_trait]
impl InstanceStore for FakeInstances {
    async fn fetch_running(
        &self,
        user: &str,
        project: &str,
        name: &str,
    ) -> Result<InstanceRecord, InstanceError> {
        let record = self.lookup(user, project, name)?;
        if record.state != InstanceState::Running {
            return Err(InstanceError::NotRunning {
                name: name.to_string(),
                state: record.state,
            });
        }
        Ok(record)
    }

    async fn fetch(
        &self,
        user: &str,
        project: &str,
        name: &str,
    ) -> Result<InstanceRecord, InstanceError> {
        self.lookup(user, project, name)
    }

    async fn libraries(
        &self,
        user: &str,
        project: &str,
        name: &str,
    ) -> Result<Vec<Library>, InstanceError> {
        self.lookup(user, project, name)?;
        Ok(self
            .libraries
            .read()
            .get(&instance_key(user, project, name))
            .cloned()
            .unwrap_or_default())
    }

    async fn update_state(
        &self,
        user: &str,
        project: &str,
        name: &str,
        state: InstanceState,
    ) -> Result<(), InstanceError> {
        let mut records = self.records.write();
        let record = records
            .get_mut(&instance_key(user, project, name))
            .ok_or_else(|| InstanceError::NotFound {
                user: user.to_string(),
                project: project.to_string(),
                name: name.to_string(),
            })?;
        record.state = state;
        Ok(())
    }

    async fn update_address(
        &self,
        user: &str,
        project: &str,
        name: &str,
        address: &str,
    ) -> Result<(), InstanceError> {
        let mut records = self.records.write();
        let record = records
            .get_mut(&instance_key(user, project, name))
            .ok_or_else(|| InstanceError::NotFound {
                user: user.to_string(),
                project: project.to_string(),
                name: name.to_string(),
            })?;
        record.address = Some(address.to_string());
        Ok(())
    }
}

/// Access checker fake: a plain allow-list of (user, resource) grants.
#[derive(Default)]
pub struct FakeAccess {
    grants: RwLock<HashSet<(String, String)>>,
}

impl FakeAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(&self, user: &str, resource: &str) {
        self.grants
            .write()
            .insert((user.to_string(), resource.to_string()));
    }
}

#[async_trait]
impl AccessChecker for FakeAccess {
    async fn has_access(
        &self,
        user: &UserContext,
        _capability: Capability,
        resource: &str,
    ) -> bool {
        self.grants
            .read()
            .contains(&(user.name.clone(), resource.to_string()))
    }
}

/// Directory fake with seedable projects, memberships, and endpoint clouds.
#[derive(Default)]
pub struct FakeDirectory {
    groups: RwLock<HashMap<String, BTreeSet<String>>>,
    memberships: RwLock<HashMap<String, Vec<String>>>,
    clouds: RwLock<HashMap<String, String>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&self, project: &str, groups: &[&str]) {
        self.groups.write().insert(
            project.to_string(),
            groups.iter().map(|g| g.to_string()).collect(),
        );
    }

    pub fn add_member(&self, user: &str, project: &str) {
        self.memberships
            .write()
            .entry(user.to_string())
            .or_default()
            .push(project.to_string());
    }

    pub fn add_endpoint(&self, endpoint: &str, cloud: &str) {
        self.clouds
            .write()
            .insert(endpoint.to_string(), cloud.to_string());
    }
}

#[async_trait]
impl ProjectDirectory for FakeDirectory {
    async fn project_groups(&self, project: &str) -> Result<BTreeSet<String>, DirectoryError> {
        self.groups
            .read()
            .get(project)
            .cloned()
            .ok_or_else(|| DirectoryError::UnknownProject(project.to_string()))
    }

    async fn user_projects(&self, user: &UserContext) -> Result<Vec<String>, DirectoryError> {
        Ok(self
            .memberships
            .read()
            .get(&user.name)
            .cloned()
            .unwrap_or_default())
    }

    async fn endpoint_cloud(&self, endpoint: &str) -> Result<String, DirectoryError> {
        self.clouds
            .read()
            .get(endpoint)
            .cloned()
            .ok_or_else(|| DirectoryError::UnknownEndpoint(endpoint.to_string()))
    }
}

/// Filter store fake.
#[derive(Default)]
pub struct FakeFilters {
    filters: RwLock<HashMap<String, ImageFilter>>,
}

impl FakeFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self, user: &str) -> Option<ImageFilter> {
        self.filters.read().get(user).cloned()
    }
}

#[async_trait]
impl FilterStore for FakeFilters {
    async fn get(&self, user: &str) -> Result<Option<ImageFilter>, SettingsError> {
        Ok(self.filters.read().get(user).cloned())
    }

    async fn put(&self, user: &str, filter: &ImageFilter) -> Result<(), SettingsError> {
        self.filters
            .write()
            .insert(user.to_string(), filter.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOp {
    Capture,
    Terminate,
}

/// One recorded gateway dispatch, with a snapshot of local state taken at
/// the moment of the call. The snapshots verify local writes were durable
/// before the external request went out.
#[derive(Debug, Clone)]
pub struct GatewayCall {
    pub op: GatewayOp,
    pub endpoint: String,
    pub access_token: String,
    pub spec: CaptureSpec,
    pub image_status_seen: Option<ImageStatus>,
    pub instance_state_seen: Option<InstanceState>,
}

/// Recording gateway fake that observes the stores it is wired next to.
pub struct FakeGateway {
    images: Arc<MemoryImageStore>,
    instances: Arc<FakeInstances>,
    calls: Mutex<Vec<GatewayCall>>,
    fail_next: AtomicBool,
    counter: AtomicUsize,
}

impl FakeGateway {
    pub fn observing(images: Arc<MemoryImageStore>, instances: Arc<FakeInstances>) -> Self {
        Self {
            images,
            instances,
            calls: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
            counter: AtomicUsize::new(0),
        }
    }

    /// Make the next dispatch fail with a gateway error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    async fn record(
        &self,
        op: GatewayOp,
        endpoint: &str,
        access_token: &str,
        spec: &CaptureSpec,
    ) -> Result<TrackingId, GatewayError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::Dispatch("gateway unavailable".to_string()));
        }

        let key = ImageKey::new(
            &spec.user,
            &spec.project,
            &spec.endpoint,
            spec.image_name.clone(),
        );
        let image_status_seen = self
            .images
            .get(&key)
            .await
            .ok()
            .flatten()
            .map(|image| image.status);
        let instance_state_seen =
            self.instances
                .state_of(&spec.user, &spec.project, &spec.instance_name);

        self.calls.lock().push(GatewayCall {
            op,
            endpoint: endpoint.to_string(),
            access_token: access_token.to_string(),
            spec: spec.clone(),
            image_status_seen,
            instance_state_seen,
        });

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TrackingId::new(format!("track-{}", n)))
    }
}

#[async_trait]
impl ProvisioningGateway for FakeGateway {
    async fn capture(
        &self,
        endpoint: &str,
        access_token: &str,
        spec: &CaptureSpec,
    ) -> Result<TrackingId, GatewayError> {
        self.record(GatewayOp::Capture, endpoint, access_token, spec)
            .await
    }

    async fn terminate(
        &self,
        endpoint: &str,
        access_token: &str,
        spec: &CaptureSpec,
    ) -> Result<TrackingId, GatewayError> {
        self.record(GatewayOp::Terminate, endpoint, access_token, spec)
            .await
    }
}

/// The full stack wired over the in-memory stores and the fakes above.
pub struct TestHarness {
    pub images: Arc<MemoryImageStore>,
    pub roles: Arc<MemoryRoleStore>,
    pub instances: Arc<FakeInstances>,
    pub access: Arc<FakeAccess>,
    pub directory: Arc<FakeDirectory>,
    pub filters: Arc<FakeFilters>,
    pub gateway: Arc<FakeGateway>,
    pub sharing: Arc<SharingEngine>,
    pub lifecycle: LifecycleManager,
    pub catalog: CatalogService,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        init_tracing();

        let images = Arc::new(MemoryImageStore::new());
        let roles = Arc::new(MemoryRoleStore::new());
        let instances = Arc::new(FakeInstances::new());
        let access = Arc::new(FakeAccess::new());
        let directory = Arc::new(FakeDirectory::new());
        let filters = Arc::new(FakeFilters::new());
        let gateway = Arc::new(FakeGateway::observing(images.clone(), instances.clone()));

        let sharing = Arc::new(SharingEngine::new(
            config,
            images.clone(),
            roles.clone(),
            access.clone(),
            directory.clone(),
        ));
        let lifecycle = LifecycleManager::new(
            images.clone(),
            instances.clone(),
            directory.clone(),
            gateway.clone(),
            sharing.clone(),
        );
        let catalog = CatalogService::new(
            images.clone(),
            sharing.clone(),
            directory.clone(),
            filters.clone(),
        );

        Self {
            images,
            roles,
            instances,
            access,
            directory,
            filters,
            gateway,
            sharing,
            lifecycle,
            catalog,
        }
    }

    /// Seed a running instance (and its endpoint's cloud tag) to capture from.
    pub fn seed_running_instance(
        &self,
        user: &str,
        project: &str,
        endpoint: &str,
        name: &str,
    ) -> InstanceRecord {
        let record = InstanceRecord {
            id: InstanceId::new(format!("i-{}", name)),
            name: name.to_string(),
            user: user.to_string(),
            project: project.to_string(),
            endpoint: endpoint.to_string(),
            state: InstanceState::Running,
            docker_image: "docker.dlab-jupyter".to_string(),
            template_name: "Jupyter notebook 6.x".to_string(),
            cluster_config: None,
            address: Some("10.0.0.1".to_string()),
        };
        self.instances.add(record.clone());
        self.directory.add_endpoint(endpoint, "AWS");
        record
    }

    /// Fetch a stored image by key, panicking when absent.
    pub async fn stored_image(&self, key: &ImageKey) -> eikona::model::Image {
        self.images
            .get(key)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("image {} should be stored", key))
    }
}
