use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use forgeline_core::{AppError, AppResult, ResourceId, TenantId, UserIdentity};
use forgeline_domain::{
    AuditAction, BatchOperationContext, DeletableResource, DeletePolicy, Department, Permission,
    reason,
};
use serde_json::json;
use tokio::sync::Mutex;

use crate::audit_ports::{AuditEvent, AuditRepository};
use crate::authorization_service::{AuthorizationService, PolicyPermissionChecker};
use crate::batch_auditor::RepositoryBatchAuditor;
use crate::batch_ports::{DeleteTransaction, ResourceAdapter};
use crate::validators::{
    CompositeValidator, ReferenceCheckValidator, ReferencePredicate, SystemProtectedValidator,
};
use crate::{AuthorizationRepository, ItemValidator};

use super::BatchDeleteService;

#[derive(Default)]
struct FakeStore {
    rows: HashMap<ResourceId, Department>,
}

impl FakeStore {
    fn descendants_of(&self, id: ResourceId) -> Vec<ResourceId> {
        let mut found = Vec::new();
        let mut pending = vec![id];
        while let Some(parent) = pending.pop() {
            for (child_id, row) in &self.rows {
                if row.parent_id() == Some(parent) {
                    found.push(*child_id);
                    pending.push(*child_id);
                }
            }
        }
        found
    }
}

struct FakeAdapter {
    store: Arc<Mutex<FakeStore>>,
    fail_resolve: bool,
    fail_delete_for: HashSet<ResourceId>,
    last_policy: Arc<Mutex<Option<DeletePolicy>>>,
}

impl FakeAdapter {
    fn new(store: Arc<Mutex<FakeStore>>) -> Self {
        Self {
            store,
            fail_resolve: false,
            fail_delete_for: HashSet::new(),
            last_policy: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl ResourceAdapter<Department> for FakeAdapter {
    async fn resolve_many(
        &self,
        tenant_id: TenantId,
        ids: &[ResourceId],
    ) -> AppResult<Vec<(ResourceId, Option<Department>)>> {
        if self.fail_resolve {
            return Err(AppError::Internal("storage connection lost".to_owned()));
        }

        let store = self.store.lock().await;
        Ok(ids
            .iter()
            .map(|id| {
                let row = store
                    .rows
                    .get(id)
                    .filter(|row| row.tenant_id() == tenant_id)
                    .cloned();
                (*id, row)
            })
            .collect())
    }

    async fn begin_delete(
        &self,
        _tenant_id: TenantId,
    ) -> AppResult<Box<dyn DeleteTransaction<Department>>> {
        Ok(Box::new(FakeTransaction {
            store: self.store.clone(),
            staged: Vec::new(),
            fail_delete_for: self.fail_delete_for.clone(),
            last_policy: self.last_policy.clone(),
        }))
    }
}

struct FakeTransaction {
    store: Arc<Mutex<FakeStore>>,
    staged: Vec<ResourceId>,
    fail_delete_for: HashSet<ResourceId>,
    last_policy: Arc<Mutex<Option<DeletePolicy>>>,
}

#[async_trait]
impl DeleteTransaction<Department> for FakeTransaction {
    async fn delete(
        &mut self,
        item: &Department,
        policy: DeletePolicy,
        force: bool,
    ) -> AppResult<()> {
        let id = item.resource_id();
        if self.fail_delete_for.contains(&id) {
            return Err(AppError::Internal(format!("failed to delete row '{id}'")));
        }

        *self.last_policy.lock().await = Some(policy);

        if force {
            let store = self.store.lock().await;
            self.staged.extend(store.descendants_of(id));
        }
        self.staged.push(id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut store = self.store.lock().await;
        for id in self.staged {
            store.rows.remove(&id);
        }
        Ok(())
    }
}

#[derive(Default)]
struct FakeAuditRepository {
    events: Mutex<Vec<AuditEvent>>,
    failing: bool,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        if self.failing {
            return Err(AppError::Internal("audit sink unavailable".to_owned()));
        }
        self.events.lock().await.push(event);
        Ok(())
    }
}

struct FakeAuthorizationRepository {
    grants: HashMap<(TenantId, String), Vec<Permission>>,
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn list_permissions_for_subject(
        &self,
        tenant_id: TenantId,
        subject: &str,
    ) -> AppResult<Vec<Permission>> {
        Ok(self
            .grants
            .get(&(tenant_id, subject.to_owned()))
            .cloned()
            .unwrap_or_default())
    }
}

struct HasChildDepartments {
    store: Arc<Mutex<FakeStore>>,
}

#[async_trait]
impl ReferencePredicate<Department> for HasChildDepartments {
    async fn dependent_exists(
        &self,
        item: &Department,
        deleted_in_batch: &[ResourceId],
    ) -> AppResult<bool> {
        let store = self.store.lock().await;
        Ok(store.rows.iter().any(|(child_id, row)| {
            row.parent_id() == Some(item.resource_id()) && !deleted_in_batch.contains(child_id)
        }))
    }

    fn reason(&self) -> &str {
        reason::HAS_CHILDREN
    }

    fn bypassed_by_force(&self) -> bool {
        true
    }
}

fn actor(tenant_id: TenantId, subject: &str) -> UserIdentity {
    UserIdentity::new(subject, subject, tenant_id)
}

fn department(
    tenant_id: TenantId,
    name: &str,
    parent_id: Option<ResourceId>,
    is_system: bool,
) -> Department {
    Department::new(ResourceId::new(), tenant_id, name, parent_id, is_system)
        .unwrap_or_else(|_| unreachable!())
}

struct Harness {
    service: BatchDeleteService<Department>,
    store: Arc<Mutex<FakeStore>>,
    audit: Arc<FakeAuditRepository>,
    last_policy: Arc<Mutex<Option<DeletePolicy>>>,
}

fn build_harness(
    tenant_id: TenantId,
    subject: &str,
    granted: Vec<Permission>,
    configure: impl FnOnce(FakeAdapter) -> FakeAdapter,
) -> Harness {
    let store = Arc::new(Mutex::new(FakeStore::default()));
    let adapter = configure(FakeAdapter::new(store.clone()));
    let last_policy = adapter.last_policy.clone();

    let grants = HashMap::from([((tenant_id, subject.to_owned()), granted)]);
    let authorization_service =
        AuthorizationService::new(Arc::new(FakeAuthorizationRepository { grants }));
    let checker = PolicyPermissionChecker::new(authorization_service, Permission::DepartmentDelete);

    let validator: Arc<dyn ItemValidator<Department>> = Arc::new(CompositeValidator::new(vec![
        Arc::new(SystemProtectedValidator::new()),
        Arc::new(ReferenceCheckValidator::new(vec![Arc::new(
            HasChildDepartments {
                store: store.clone(),
            },
        )])),
    ]));

    let audit = Arc::new(FakeAuditRepository::default());
    let service = BatchDeleteService::new(Arc::new(adapter))
        .with_validator(validator)
        .with_permission_checker(Arc::new(checker))
        .with_auditor(Arc::new(RepositoryBatchAuditor::new(audit.clone())));

    Harness {
        service,
        store,
        audit,
        last_policy,
    }
}

fn delete_grant() -> Vec<Permission> {
    vec![Permission::DepartmentDelete]
}

async fn seed(store: &Arc<Mutex<FakeStore>>, rows: &[Department]) {
    let mut store = store.lock().await;
    for row in rows {
        store.rows.insert(row.resource_id(), row.clone());
    }
}

#[tokio::test]
async fn deletes_all_items_in_input_order() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let rows = [
        department(tenant_id, "welding", None, false),
        department(tenant_id, "assembly", None, false),
        department(tenant_id, "paint", None, false),
    ];
    seed(&harness.store, &rows).await;
    let ids: Vec<ResourceId> = rows.iter().map(|row| row.resource_id()).collect();

    let result = harness
        .service
        .batch_delete(&actor(tenant_id, "alice"), &ids, &BatchOperationContext::new())
        .await;

    let result = result.unwrap_or_default();
    assert_eq!(result.deleted_count(), 3);
    assert_eq!(result.deleted_ids(), ids.as_slice());
    assert!(result.failed_items().is_empty());
    assert!(result.skipped_items().is_empty());
    assert!(harness.store.lock().await.rows.is_empty());
}

#[tokio::test]
async fn system_protected_item_is_skipped_not_failed() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let rows = [
        department(tenant_id, "line-1", None, false),
        department(tenant_id, "root", None, true),
        department(tenant_id, "line-2", None, false),
    ];
    seed(&harness.store, &rows).await;
    let ids: Vec<ResourceId> = rows.iter().map(|row| row.resource_id()).collect();

    let result = harness
        .service
        .batch_delete(&actor(tenant_id, "alice"), &ids, &BatchOperationContext::new())
        .await;

    let result = result.unwrap_or_default();
    assert_eq!(result.deleted_count(), 2);
    assert_eq!(result.deleted_ids(), &[ids[0], ids[2]]);
    assert_eq!(result.skipped_items().len(), 1);
    assert_eq!(result.skipped_items()[0].id, ids[1]);
    assert_eq!(result.skipped_items()[0].reason, reason::SYSTEM_PROTECTED);
    assert!(harness.store.lock().await.rows.contains_key(&ids[1]));
}

#[tokio::test]
async fn department_with_children_requires_force_escalation() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let parent = department(tenant_id, "plant", None, false);
    let child = department(tenant_id, "bay-7", Some(parent.resource_id()), false);
    seed(&harness.store, &[parent.clone(), child.clone()]).await;
    let ids = vec![parent.resource_id()];

    let first = harness
        .service
        .batch_delete(&actor(tenant_id, "alice"), &ids, &BatchOperationContext::new())
        .await;
    let first = first.unwrap_or_default();
    assert_eq!(first.deleted_count(), 0);
    assert_eq!(first.skipped_items().len(), 1);
    assert_eq!(first.skipped_items()[0].reason, reason::HAS_CHILDREN);

    let forced_context =
        BatchOperationContext::new().with(BatchOperationContext::FORCE_KEY, json!(true));
    let second = harness
        .service
        .batch_delete(&actor(tenant_id, "alice"), &ids, &forced_context)
        .await;
    let second = second.unwrap_or_default();
    assert_eq!(second.deleted_ids(), &[parent.resource_id()]);

    // Force cascades: the child went away inside the same transaction.
    assert!(harness.store.lock().await.rows.is_empty());
}

#[tokio::test]
async fn leaves_first_order_clears_a_subtree_without_force() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let parent = department(tenant_id, "plant", None, false);
    let child = department(tenant_id, "bay-7", Some(parent.resource_id()), false);
    seed(&harness.store, &[parent.clone(), child.clone()]).await;
    let ids = vec![child.resource_id(), parent.resource_id()];

    let result = harness
        .service
        .batch_delete(&actor(tenant_id, "alice"), &ids, &BatchOperationContext::new())
        .await;

    // The child's delete is only staged, but validation of the parent must
    // already see it as gone.
    let result = result.unwrap_or_default();
    assert_eq!(result.deleted_ids(), ids.as_slice());
    assert!(result.skipped_items().is_empty());
    assert!(result.failed_items().is_empty());
    assert!(harness.store.lock().await.rows.is_empty());
}

#[tokio::test]
async fn permission_denial_aborts_without_item_outcomes() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "mallory", Vec::new(), |adapter| adapter);
    let row = department(tenant_id, "welding", None, false);
    seed(&harness.store, &[row.clone()]).await;

    let result = harness
        .service
        .batch_delete(
            &actor(tenant_id, "mallory"),
            &[row.resource_id()],
            &BatchOperationContext::new(),
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(harness.audit.events.lock().await.is_empty());
    assert!(harness.store.lock().await.rows.contains_key(&row.resource_id()));
}

#[tokio::test]
async fn unresolved_id_is_reported_not_found() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let row = department(tenant_id, "welding", None, false);
    seed(&harness.store, &[row.clone()]).await;
    let missing = ResourceId::new();

    let result = harness
        .service
        .batch_delete(
            &actor(tenant_id, "alice"),
            &[row.resource_id(), missing],
            &BatchOperationContext::new(),
        )
        .await;

    let result = result.unwrap_or_default();
    assert_eq!(result.deleted_ids(), &[row.resource_id()]);
    assert_eq!(result.failed_items().len(), 1);
    assert_eq!(result.failed_items()[0].id, missing);
    assert_eq!(result.failed_items()[0].reason, reason::NOT_FOUND);
}

#[tokio::test]
async fn empty_input_is_a_structural_rejection() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);

    let result = harness
        .service
        .batch_delete(&actor(tenant_id, "alice"), &[], &BatchOperationContext::new())
        .await;

    match result {
        Err(AppError::Validation(message)) => assert!(message.contains(reason::MISSING_FIELD)),
        other => panic!("expected structural rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn oversized_batch_is_rejected_before_storage_access() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let service = harness.service.with_max_batch_size(2);
    let ids: Vec<ResourceId> = (0..3).map(|_| ResourceId::new()).collect();

    let result = service
        .batch_delete(&actor(tenant_id, "alice"), &ids, &BatchOperationContext::new())
        .await;

    match result {
        Err(AppError::Validation(message)) => {
            assert!(message.contains(reason::BATCH_SIZE_EXCEEDED));
        }
        other => panic!("expected structural rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn all_skipped_outcome_is_idempotent() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let rows = [
        department(tenant_id, "seeded-a", None, true),
        department(tenant_id, "seeded-b", None, true),
    ];
    seed(&harness.store, &rows).await;
    let ids: Vec<ResourceId> = rows.iter().map(|row| row.resource_id()).collect();
    let principal = actor(tenant_id, "alice");
    let context = BatchOperationContext::new();

    let first = harness
        .service
        .batch_delete(&principal, &ids, &context)
        .await
        .unwrap_or_default();
    let second = harness
        .service
        .batch_delete(&principal, &ids, &context)
        .await
        .unwrap_or_default();

    assert_eq!(first, second);
    assert_eq!(first.deleted_count(), 0);
    assert_eq!(first.skipped_items().len(), 2);
}

#[tokio::test]
async fn resolution_failure_leaves_every_row_in_place() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |mut adapter| {
        adapter.fail_resolve = true;
        adapter
    });
    let rows = [
        department(tenant_id, "welding", None, false),
        department(tenant_id, "paint", None, false),
    ];
    seed(&harness.store, &rows).await;
    let ids: Vec<ResourceId> = rows.iter().map(|row| row.resource_id()).collect();

    let result = harness
        .service
        .batch_delete(&actor(tenant_id, "alice"), &ids, &BatchOperationContext::new())
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert_eq!(harness.store.lock().await.rows.len(), 2);
}

#[tokio::test]
async fn one_delete_failure_never_blocks_siblings() {
    let tenant_id = TenantId::new();
    let rows = [
        department(tenant_id, "line-1", None, false),
        department(tenant_id, "line-2", None, false),
        department(tenant_id, "line-3", None, false),
    ];
    let broken = rows[1].resource_id();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |mut adapter| {
        adapter.fail_delete_for.insert(broken);
        adapter
    });
    seed(&harness.store, &rows).await;
    let ids: Vec<ResourceId> = rows.iter().map(|row| row.resource_id()).collect();

    let result = harness
        .service
        .batch_delete(&actor(tenant_id, "alice"), &ids, &BatchOperationContext::new())
        .await;

    let result = result.unwrap_or_default();
    assert_eq!(result.deleted_ids(), &[ids[0], ids[2]]);
    assert_eq!(result.failed_items().len(), 1);
    assert_eq!(result.failed_items()[0].id, broken);
    // Best-effort commit: the successes are gone, the broken row remains.
    assert_eq!(harness.store.lock().await.rows.len(), 1);
}

#[tokio::test]
async fn auditor_failure_is_swallowed() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let failing_audit = Arc::new(FakeAuditRepository {
        events: Mutex::new(Vec::new()),
        failing: true,
    });
    let service = harness
        .service
        .with_auditor(Arc::new(RepositoryBatchAuditor::new(failing_audit)));
    let row = department(tenant_id, "welding", None, false);
    seed(&harness.store, &[row.clone()]).await;

    let result = service
        .batch_delete(
            &actor(tenant_id, "alice"),
            &[row.resource_id()],
            &BatchOperationContext::new(),
        )
        .await;

    let result = result.unwrap_or_default();
    assert_eq!(result.deleted_count(), 1);
}

#[tokio::test]
async fn audit_events_follow_start_item_complete_order() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let rows = [
        department(tenant_id, "line-1", None, false),
        department(tenant_id, "root", None, true),
    ];
    seed(&harness.store, &rows).await;
    let ids: Vec<ResourceId> = rows.iter().map(|row| row.resource_id()).collect();

    let result = harness
        .service
        .batch_delete(&actor(tenant_id, "alice"), &ids, &BatchOperationContext::new())
        .await;
    assert!(result.is_ok());

    let events = harness.audit.events.lock().await;
    let actions: Vec<AuditAction> = events.iter().map(|event| event.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::BatchDeleteStarted,
            AuditAction::BatchDeleteItem,
            AuditAction::BatchDeleteItem,
            AuditAction::BatchDeleteCompleted,
        ]
    );
    assert_eq!(events[1].resource_id, ids[0].to_string());
    assert_eq!(events[2].resource_id, ids[1].to_string());

    let start_detail = events[0].detail.clone().unwrap_or_default();
    assert!(start_detail.contains(r#""principal":"alice""#));
}

#[tokio::test]
async fn duplicate_ids_collapse_to_first_occurrence() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let rows = [
        department(tenant_id, "line-1", None, false),
        department(tenant_id, "line-2", None, false),
    ];
    seed(&harness.store, &rows).await;
    let first = rows[0].resource_id();
    let second = rows[1].resource_id();

    let result = harness
        .service
        .batch_delete(
            &actor(tenant_id, "alice"),
            &[first, first, second, first],
            &BatchOperationContext::new(),
        )
        .await;

    let result = result.unwrap_or_default();
    assert_eq!(result.deleted_ids(), &[first, second]);
    assert!(result.failed_items().is_empty());
}

#[tokio::test]
async fn composite_validator_reports_first_rejection() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    // System-protected AND has a child: the system check runs first and wins.
    let parent = department(tenant_id, "root", None, true);
    let child = department(tenant_id, "bay-1", Some(parent.resource_id()), false);
    seed(&harness.store, &[parent.clone(), child]).await;

    let result = harness
        .service
        .batch_delete(
            &actor(tenant_id, "alice"),
            &[parent.resource_id()],
            &BatchOperationContext::new(),
        )
        .await;

    let result = result.unwrap_or_default();
    assert_eq!(result.skipped_items().len(), 1);
    assert_eq!(result.skipped_items()[0].reason, reason::SYSTEM_PROTECTED);
}

#[tokio::test]
async fn delete_policy_is_passed_through_to_the_adapter() {
    let tenant_id = TenantId::new();
    let harness = build_harness(tenant_id, "alice", delete_grant(), |adapter| adapter);
    let service = harness.service.with_delete_policy(DeletePolicy::Soft);
    let row = department(tenant_id, "welding", None, false);
    seed(&harness.store, &[row.clone()]).await;

    let result = service
        .batch_delete(
            &actor(tenant_id, "alice"),
            &[row.resource_id()],
            &BatchOperationContext::new(),
        )
        .await;
    assert!(result.is_ok());

    let policy = *harness.last_policy.lock().await;
    assert_eq!(policy, Some(DeletePolicy::Soft));
}
