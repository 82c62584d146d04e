use crate::{
    error::{ScheduleError, ScheduleResult},
    schedule::{Identity, Role},
};

#[derive(Queryable)]
pub struct ProfileData {
    pub id: String,
    pub full_name: String,
    pub user_type: String,
}

impl ProfileData {
    /// Who this profile row signs in as. Unknown user types cannot sign in.
    pub fn into_identity(self) -> ScheduleResult<Identity> {
        let role = self
            .user_type
            .parse::<Role>()
            .map_err(|err| ScheduleError::unauthorized(err.to_string()))?;
        Ok(Identity {
            user_id: self.id,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_type: &str) -> ProfileData {
        ProfileData {
            id: "u1".to_string(),
            full_name: "Sam Client".to_string(),
            user_type: user_type.to_string(),
        }
    }

    #[test]
    fn stored_user_types_map_to_roles() {
        assert_eq!(row("user").into_identity().unwrap().role, Role::Client);
        assert_eq!(row("counselor").into_identity().unwrap().role, Role::Counselor);
        assert_eq!(row("admin").into_identity().unwrap().user_id, "u1");
        assert_eq!(row("guest").into_identity().unwrap_err().code(), "unauthorized");
    }
}
