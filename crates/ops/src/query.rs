//! Read-only queries

use tsdist_types::TypeDefinition;

use crate::OpsCtx;

/// Resolved type-definition table, in install order
#[must_use]
pub fn list_definitions(ctx: &OpsCtx) -> Vec<TypeDefinition> {
    ctx.config.type_definitions()
}
