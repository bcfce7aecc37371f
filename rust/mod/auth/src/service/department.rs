use kpidash_core::{new_id, now_rfc3339, Principal, ServiceError};
use kpidash_store::{Action, Query, RecordStoreExt, StoreError};

use crate::model::{Department, DepartmentInput};
use crate::service::AuthService;

fn clean_name(name: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("department name is required".into()));
    }
    Ok(name.to_string())
}

fn name_conflict(name: &str) -> impl FnOnce(StoreError) -> ServiceError + '_ {
    move |e| match ServiceError::from(e) {
        ServiceError::Conflict(_) => {
            ServiceError::Conflict(format!("department '{}' already exists", name))
        }
        other => other,
    }
}

impl AuthService {
    /// All departments, alphabetical.
    pub fn list_departments(&self) -> Result<Vec<Department>, ServiceError> {
        let (items, _) = self
            .store
            .query::<Department>(&Query::new().order_by("name", false))?;
        Ok(items)
    }

    pub fn create_department(&self, actor: &Principal, input: DepartmentInput) -> Result<Department, ServiceError> {
        let now = now_rfc3339();
        let dept = Department {
            id: new_id(),
            name: clean_name(&input.name)?,
            description: input.description.filter(|d| !d.trim().is_empty()),
            created_at: now.clone(),
            updated_at: now,
        };
        self.store.create(&dept).map_err(name_conflict(&dept.name))?;
        self.activity.record(actor, Action::Create, "department", &dept.id, Some(serde_json::json!({ "name": dept.name })));
        Ok(dept)
    }

    pub fn update_department(
        &self,
        actor: &Principal,
        id: &str,
        input: DepartmentInput,
    ) -> Result<Department, ServiceError> {
        let mut dept = self.store.fetch::<Department>(id)?;
        dept.name = clean_name(&input.name)?;
        dept.description = input.description.filter(|d| !d.trim().is_empty());
        dept.updated_at = now_rfc3339();
        if !self.store.save(&dept).map_err(name_conflict(&dept.name))? {
            return Err(ServiceError::not_found("department", id));
        }
        self.activity.record(actor, Action::Update, "department", id, Some(serde_json::json!({ "name": dept.name })));
        Ok(dept)
    }

    pub fn delete_department(&self, actor: &Principal, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove::<Department>(id)? {
            return Err(ServiceError::not_found("department", id));
        }
        self.activity.record(actor, Action::Delete, "department", id, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{admin, memory_service, sqlite_service};

    fn input(name: &str) -> DepartmentInput {
        DepartmentInput {
            name: name.into(),
            description: None,
        }
    }

    #[test]
    fn departments_are_sorted_and_unique() {
        for svc in [memory_service(), sqlite_service()] {
            svc.create_department(&admin(), input("Üretim")).unwrap();
            svc.create_department(&admin(), input("Kalite")).unwrap();
            svc.create_department(&admin(), input("Lojistik")).unwrap();

            let names: Vec<_> = svc.list_departments().unwrap().into_iter().map(|d| d.name).collect();
            assert_eq!(names, vec!["Kalite", "Lojistik", "Üretim"]);

            assert!(matches!(
                svc.create_department(&admin(), input(" Kalite ")),
                Err(ServiceError::Conflict(_))
            ));
        }
    }

    #[test]
    fn blank_name_rejected() {
        let svc = memory_service();
        assert!(matches!(
            svc.create_department(&admin(), input("  ")),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn rename_and_delete() {
        let svc = memory_service();
        let a = svc.create_department(&admin(), input("Kalite")).unwrap();
        let b = svc.create_department(&admin(), input("Bakim")).unwrap();

        assert!(matches!(
            svc.update_department(&admin(), &b.id, input("Kalite")),
            Err(ServiceError::Conflict(_))
        ));
        let renamed = svc.update_department(&admin(), &b.id, input("Bakım")).unwrap();
        assert_eq!(renamed.name, "Bakım");

        svc.delete_department(&admin(), &a.id).unwrap();
        assert!(matches!(
            svc.delete_department(&admin(), &a.id),
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(svc.list_departments().unwrap().len(), 1);
    }
}
