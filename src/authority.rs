//! Decides who may act on campaign-owned resources.
use uuid::Uuid;

use crate::error::AppError;
use crate::session::Session;
use crate::users::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Permit,
    Forbidden,
    NotFound,
}

/// The one place that answers "may this session touch that resource?":
/// administrators may touch everything, otherwise only the owner may.
/// A missing resource is its own answer so handlers cannot leak a 403
/// for something that does not exist.
pub fn evaluate(session: &Session, owner: Option<&Uuid>) -> Access {
    match owner {
        None => Access::NotFound,
        Some(_) if session.role == Role::Admin => Access::Permit,
        Some(owner) if *owner == session.user_id => Access::Permit,
        Some(_) => Access::Forbidden,
    }
}

/// Unwraps a fetched resource once the session is allowed to act on it.
pub fn own<R, F>(session: &Session, found: Option<R>, owner_of: F, what: &'static str) -> Result<R, AppError>
where
    F: Fn(&R) -> &Uuid,
{
    match found {
        None => Err(AppError::NotFound(what)),
        Some(resource) => match evaluate(session, Some(owner_of(&resource))) {
            Access::Permit => Ok(resource),
            Access::Forbidden => Err(AppError::NoPermission),
            Access::NotFound => Err(AppError::NotFound(what)),
        },
    }
}

pub fn require_admin(session: &Session) -> Result<(), AppError> {
    if session.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::NoPermission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_id: Uuid, role: Role) -> Session {
        Session { user_id, role }
    }

    #[test]
    fn evaluate_truth_table() {
        let owner_id = Uuid::new_v4();
        let stranger_id = Uuid::new_v4();
        let owner = session(owner_id, Role::Standard);
        let stranger = session(stranger_id, Role::Standard);
        let admin = session(stranger_id, Role::Admin);

        assert_eq!(evaluate(&owner, Some(&owner_id)), Access::Permit);
        assert_eq!(evaluate(&stranger, Some(&owner_id)), Access::Forbidden);
        assert_eq!(evaluate(&admin, Some(&owner_id)), Access::Permit);
        assert_eq!(evaluate(&owner, None), Access::NotFound);
        assert_eq!(evaluate(&admin, None), Access::NotFound);
    }

    #[derive(Debug)]
    struct Owned {
        owner_id: Uuid,
    }

    #[test]
    fn own_maps_to_errors() {
        let owner_id = Uuid::new_v4();
        let owner = session(owner_id, Role::Standard);
        let stranger = session(Uuid::new_v4(), Role::Standard);

        let resource = Owned { owner_id };
        assert!(own(&owner, Some(resource), |r| &r.owner_id, "Campaign").is_ok());

        let resource = Owned { owner_id };
        let err = own(&stranger, Some(resource), |r| &r.owner_id, "Campaign").unwrap_err();
        assert!(matches!(err, AppError::NoPermission));

        let err = own(&stranger, None::<Owned>, |r| &r.owner_id, "Campaign").unwrap_err();
        assert_eq!(err.to_string(), "Campaign not found");
    }

    #[test]
    fn admin_gate() {
        let admin = session(Uuid::new_v4(), Role::Admin);
        let standard = session(Uuid::new_v4(), Role::Standard);
        assert!(require_admin(&admin).is_ok());
        assert!(matches!(require_admin(&standard), Err(AppError::NoPermission)));
    }
}
