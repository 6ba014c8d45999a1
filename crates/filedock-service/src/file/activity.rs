//! Activity decoration for display.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use filedock_core::traits::identity::IdentityLookup;
use filedock_entity::file::Activity;

/// An activity record decorated with the actor's display identity.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityView {
    /// The underlying activity record.
    #[serde(flatten)]
    pub activity: Activity,
    /// The actor's display name, when the directory resolved it.
    pub actor_name: Option<String>,
    /// The actor's email, when the directory resolved it.
    pub actor_email: Option<String>,
}

/// Decorate activities with actor identities.
///
/// Identity lookup is best-effort: on failure the records are returned
/// undecorated rather than failing the request.
pub async fn decorate(
    identity: &dyn IdentityLookup,
    activities: Vec<Activity>,
) -> Vec<ActivityView> {
    let mut actor_ids: Vec<Uuid> = activities.iter().map(|a| a.actor_id).collect();
    actor_ids.sort();
    actor_ids.dedup();

    let identities: HashMap<Uuid, _> = match identity.lookup_users(&actor_ids).await {
        Ok(users) => users.into_iter().map(|u| (u.user_id, u)).collect(),
        Err(e) => {
            debug!("Identity lookup failed, returning undecorated activities: {e}");
            HashMap::new()
        }
    };

    activities
        .into_iter()
        .map(|activity| {
            let resolved = identities.get(&activity.actor_id);
            ActivityView {
                actor_name: resolved.map(|u| u.display_name.clone()),
                actor_email: resolved.map(|u| u.email.clone()),
                activity,
            }
        })
        .collect()
}

/// Decorate a single activity.
pub async fn decorate_one(identity: &dyn IdentityLookup, activity: Activity) -> ActivityView {
    let resolved = match identity.lookup_users(&[activity.actor_id]).await {
        Ok(users) => users.into_iter().find(|u| u.user_id == activity.actor_id),
        Err(e) => {
            debug!("Identity lookup failed, returning undecorated activity: {e}");
            None
        }
    };
    ActivityView {
        actor_name: resolved.as_ref().map(|u| u.display_name.clone()),
        actor_email: resolved.map(|u| u.email),
        activity,
    }
}
