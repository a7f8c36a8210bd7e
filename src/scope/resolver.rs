use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{GlobalRole, Principal};
use crate::database::models::{AccessibleTenant, TenantId};
use crate::database::TenantDirectory;

use super::error::ScopeError;
use super::predicate::TenantPredicate;

/// Raw restaurant hints lifted from the request, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHints {
    pub header: Option<String>,
    pub query: Option<String>,
    pub path: Option<String>,
}

impl RequestHints {
    /// First non-blank explicit hint in precedence order: header, query, path.
    pub fn explicit(&self) -> Option<(HintSource, &str)> {
        [
            (HintSource::Header, self.header.as_deref()),
            (HintSource::Query, self.query.as_deref()),
            (HintSource::Path, self.path.as_deref()),
        ]
        .into_iter()
        .find_map(|(source, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (source, v))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintSource {
    Header,
    Query,
    Path,
    /// No explicit hint; the principal has exactly one restaurant.
    SingletonFallback,
}

impl HintSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            HintSource::Header => "header",
            HintSource::Query => "query",
            HintSource::Path => "path",
            HintSource::SingletonFallback => "singleton fallback",
        }
    }
}

/// Per-request access decision. Only the resolver builds one, so a resolved
/// restaurant is always a member of the accessible set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantScope {
    resolved_tenant_id: Option<TenantId>,
    accessible_tenant_ids: BTreeSet<TenantId>,
    is_owner: bool,
    resolved_slug: Option<String>,
    resolved_role: Option<String>,
    source: Option<HintSource>,
}

impl TenantScope {
    /// No restaurant access at all.
    pub fn empty() -> Self {
        Self {
            resolved_tenant_id: None,
            accessible_tenant_ids: BTreeSet::new(),
            is_owner: false,
            resolved_slug: None,
            resolved_role: None,
            source: None,
        }
    }

    pub fn resolved_tenant_id(&self) -> Option<TenantId> {
        self.resolved_tenant_id
    }

    pub fn accessible_tenant_ids(&self) -> &BTreeSet<TenantId> {
        &self.accessible_tenant_ids
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn resolved_slug(&self) -> Option<&str> {
        self.resolved_slug.as_deref()
    }

    /// Staff role held in the resolved restaurant.
    pub fn resolved_role(&self) -> Option<&str> {
        self.resolved_role.as_deref()
    }

    pub fn source(&self) -> Option<HintSource> {
        self.source
    }

    pub fn has_access(&self) -> bool {
        !self.accessible_tenant_ids.is_empty()
    }

    pub fn predicate(&self) -> TenantPredicate {
        match self.resolved_tenant_id {
            Some(id) => TenantPredicate::Exact(id),
            None if !self.accessible_tenant_ids.is_empty() => {
                TenantPredicate::AnyOf(self.accessible_tenant_ids.iter().copied().collect())
            }
            None => TenantPredicate::Nothing,
        }
    }

    /// The single restaurant a write must target.
    pub fn require_tenant(&self) -> Result<TenantId, ScopeError> {
        self.resolved_tenant_id.ok_or(ScopeError::TenantContextRequired)
    }
}

/// Pure resolution over an already-loaded accessible set.
pub fn resolve_with(
    principal: &Principal,
    hints: &RequestHints,
    accessible: &[AccessibleTenant],
) -> Result<TenantScope, ScopeError> {
    if accessible.is_empty() {
        debug!("Principal {} has no restaurant access", principal.id);
        return Ok(TenantScope::empty());
    }

    let accessible_tenant_ids: BTreeSet<TenantId> =
        accessible.iter().map(|t| t.tenant_id).collect();

    let selected = match hints.explicit() {
        Some((source, hint)) => {
            let Some(tenant) = find_by_hint(accessible, hint) else {
                warn!(
                    "Principal {} denied restaurant '{}' supplied via {}",
                    principal.id,
                    hint,
                    source.as_str()
                );
                return Err(ScopeError::AccessDenied);
            };
            debug!(
                "Resolved restaurant {} for principal {} from {}",
                tenant.tenant_id,
                principal.id,
                source.as_str()
            );
            Some((source, tenant))
        }
        None if accessible.len() == 1 => {
            let tenant = &accessible[0];
            debug!(
                "Resolved restaurant {} for principal {} by singleton fallback",
                tenant.tenant_id, principal.id
            );
            Some((HintSource::SingletonFallback, tenant))
        }
        None => {
            debug!(
                "Principal {} has {} restaurants and no hint; leaving scope unresolved",
                principal.id,
                accessible.len()
            );
            None
        }
    };

    let scope = match selected {
        Some((source, tenant)) => TenantScope {
            resolved_tenant_id: Some(tenant.tenant_id),
            accessible_tenant_ids,
            is_owner: principal.global_role == GlobalRole::Elevated,
            resolved_slug: Some(tenant.slug.clone()),
            resolved_role: Some(tenant.role.clone()),
            source: Some(source),
        },
        None => TenantScope {
            accessible_tenant_ids,
            ..TenantScope::empty()
        },
    };

    Ok(scope)
}

/// Hints name a restaurant by numeric id or by slug.
fn find_by_hint<'a>(
    accessible: &'a [AccessibleTenant],
    hint: &str,
) -> Option<&'a AccessibleTenant> {
    if let Ok(id) = hint.parse::<TenantId>() {
        if let Some(tenant) = accessible.iter().find(|t| t.tenant_id == id) {
            return Some(tenant);
        }
    }
    accessible.iter().find(|t| t.slug == hint)
}

/// Loads assignments from the directory and resolves the request's scope.
#[derive(Clone)]
pub struct TenantResolver {
    directory: Arc<dyn TenantDirectory>,
}

impl TenantResolver {
    pub fn new(directory: Arc<dyn TenantDirectory>) -> Self {
        Self { directory }
    }

    /// Fails only on storage errors or a hint outside the accessible set.
    pub async fn resolve(
        &self,
        principal: &Principal,
        hints: &RequestHints,
    ) -> Result<TenantScope, ScopeError> {
        let accessible = self.directory.accessible_tenants(principal.id).await?;
        resolve_with(principal, hints, &accessible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn principal(role: GlobalRole) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            global_role: role,
        }
    }

    fn tenant(id: TenantId, slug: &str) -> AccessibleTenant {
        AccessibleTenant {
            tenant_id: id,
            slug: slug.to_string(),
            role: "staff".to_string(),
        }
    }

    fn hints(header: Option<&str>, query: Option<&str>, path: Option<&str>) -> RequestHints {
        RequestHints {
            header: header.map(str::to_string),
            query: query.map(str::to_string),
            path: path.map(str::to_string),
        }
    }

    fn five_and_nine() -> Vec<AccessibleTenant> {
        vec![tenant(5, "harbor"), tenant(9, "uptown")]
    }

    #[test]
    fn no_assignments_yields_empty_scope_even_with_hint() {
        let p = principal(GlobalRole::Elevated);
        let scope = resolve_with(&p, &hints(Some("5"), None, None), &[]).unwrap();
        assert_eq!(scope, TenantScope::empty());
        assert!(!scope.is_owner());
        assert_eq!(scope.predicate(), TenantPredicate::Nothing);
        assert!(matches!(scope.require_tenant(), Err(ScopeError::TenantContextRequired)));
    }

    #[test]
    fn header_hint_outside_set_is_denied() {
        let p = principal(GlobalRole::Ordinary);
        let err = resolve_with(&p, &hints(Some("7"), None, None), &five_and_nine()).unwrap_err();
        assert!(matches!(err, ScopeError::AccessDenied));
    }

    #[test]
    fn header_hint_inside_set_resolves() {
        let p = principal(GlobalRole::Ordinary);
        let scope = resolve_with(&p, &hints(Some("9"), None, None), &five_and_nine()).unwrap();
        assert_eq!(scope.resolved_tenant_id(), Some(9));
        let ids: Vec<TenantId> = scope.accessible_tenant_ids().iter().copied().collect();
        assert_eq!(ids, vec![5, 9]);
        assert_eq!(scope.resolved_slug(), Some("uptown"));
        assert_eq!(scope.source(), Some(HintSource::Header));
        assert_eq!(scope.predicate(), TenantPredicate::Exact(9));
    }

    #[test]
    fn header_beats_query_beats_path() {
        let accessible = vec![tenant(1, "a"), tenant(2, "b"), tenant(3, "c")];
        let p = principal(GlobalRole::Ordinary);

        let scope = resolve_with(&p, &hints(Some("1"), Some("2"), Some("3")), &accessible).unwrap();
        assert_eq!(scope.resolved_tenant_id(), Some(1));

        let scope = resolve_with(&p, &hints(None, Some("2"), Some("3")), &accessible).unwrap();
        assert_eq!(scope.resolved_tenant_id(), Some(2));
        assert_eq!(scope.source(), Some(HintSource::Query));

        let scope = resolve_with(&p, &hints(None, None, Some("3")), &accessible).unwrap();
        assert_eq!(scope.resolved_tenant_id(), Some(3));
        assert_eq!(scope.source(), Some(HintSource::Path));
    }

    #[test]
    fn invalid_header_is_not_rescued_by_valid_query() {
        let p = principal(GlobalRole::Ordinary);
        let h = hints(Some("7"), Some("5"), None);
        let err = resolve_with(&p, &h, &five_and_nine()).unwrap_err();
        assert!(matches!(err, ScopeError::AccessDenied));
    }

    #[test]
    fn blank_hints_are_ignored() {
        let scope = resolve_with(
            &principal(GlobalRole::Ordinary),
            &hints(Some("  "), Some(""), None),
            &[tenant(5, "harbor")],
        )
        .unwrap();
        assert_eq!(scope.resolved_tenant_id(), Some(5));
        assert_eq!(scope.source(), Some(HintSource::SingletonFallback));
    }

    #[test]
    fn singleton_falls_back_to_only_tenant() {
        let p = principal(GlobalRole::Ordinary);
        let scope = resolve_with(&p, &RequestHints::default(), &[tenant(5, "harbor")]).unwrap();
        assert_eq!(scope.resolved_tenant_id(), Some(5));
        assert_eq!(scope.source(), Some(HintSource::SingletonFallback));
    }

    #[test]
    fn multiple_tenants_without_hint_stay_unresolved() {
        let p = principal(GlobalRole::Elevated);
        let scope = resolve_with(&p, &RequestHints::default(), &five_and_nine()).unwrap();
        assert_eq!(scope.resolved_tenant_id(), None);
        assert!(!scope.is_owner());
        assert!(scope.has_access());
        assert_eq!(scope.predicate(), TenantPredicate::AnyOf(vec![5, 9]));
        assert!(matches!(scope.require_tenant(), Err(ScopeError::TenantContextRequired)));
    }

    #[test]
    fn slug_hint_resolves() {
        let p = principal(GlobalRole::Ordinary);
        let h = hints(None, Some("harbor"), None);
        let scope = resolve_with(&p, &h, &five_and_nine()).unwrap();
        assert_eq!(scope.resolved_tenant_id(), Some(5));
    }

    #[test]
    fn owner_requires_elevated_role_and_resolution() {
        let accessible = five_and_nine();
        let with_hint = hints(Some("5"), None, None);

        let elevated = principal(GlobalRole::Elevated);
        let ordinary = principal(GlobalRole::Ordinary);
        let no_hint = RequestHints::default();

        assert!(resolve_with(&elevated, &with_hint, &accessible).unwrap().is_owner());
        assert!(!resolve_with(&ordinary, &with_hint, &accessible).unwrap().is_owner());
        assert!(!resolve_with(&elevated, &no_hint, &accessible).unwrap().is_owner());
        assert!(!resolve_with(&elevated, &no_hint, &[]).unwrap().is_owner());
    }

    #[test]
    fn resolved_tenant_is_always_accessible() {
        let accessible = vec![tenant(2, "b"), tenant(4, "d"), tenant(6, "f")];
        let candidates = ["1", "2", "3", "4", "5", "6", "b", "z", ""];
        for header in candidates {
            for query in candidates {
                let h = hints(Some(header), Some(query), None);
                if let Ok(scope) = resolve_with(&principal(GlobalRole::Elevated), &h, &accessible) {
                    if let Some(id) = scope.resolved_tenant_id() {
                        assert!(scope.accessible_tenant_ids().contains(&id));
                    }
                }
            }
        }
    }

    struct FixedDirectory(Vec<AccessibleTenant>);

    #[async_trait::async_trait]
    impl TenantDirectory for FixedDirectory {
        async fn accessible_tenants(
            &self,
            _principal_id: Uuid,
        ) -> Result<Vec<AccessibleTenant>, crate::database::DatabaseError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenDirectory;

    #[async_trait::async_trait]
    impl TenantDirectory for BrokenDirectory {
        async fn accessible_tenants(
            &self,
            _principal_id: Uuid,
        ) -> Result<Vec<AccessibleTenant>, crate::database::DatabaseError> {
            Err(crate::database::DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn resolver_loads_from_directory() {
        let resolver = TenantResolver::new(Arc::new(FixedDirectory(five_and_nine())));
        let scope = resolver
            .resolve(&principal(GlobalRole::Ordinary), &hints(None, None, Some("9")))
            .await
            .unwrap();
        assert_eq!(scope.resolved_tenant_id(), Some(9));
    }

    #[tokio::test]
    async fn directory_failure_propagates_as_storage_error() {
        let resolver = TenantResolver::new(Arc::new(BrokenDirectory));
        let err = resolver
            .resolve(&principal(GlobalRole::Ordinary), &RequestHints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScopeError::Storage(_)));
    }
}
