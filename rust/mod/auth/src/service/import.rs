use kpidash_core::{Principal, Role, ServiceError};
use kpidash_import::{parse_table, ImportError};
use kpidash_store::Action;

use crate::model::{CreateUser, ImportReport, SkippedRow};
use crate::service::AuthService;
use crate::store_impls::{check_password_strength, hash_password};

const USERNAME: &[&str] = &["username", "kullanıcı adı", "kullanici", "kullanıcı"];
const NAME: &[&str] = &["name", "display name", "ad soyad", "adı soyadı", "isim"];
const EMAIL: &[&str] = &["email", "e-mail", "e-posta", "eposta"];
const DEPARTMENT: &[&str] = &["department", "departman", "bölüm"];
const ROLE: &[&str] = &["role", "rol", "yetki"];
const PASSWORD: &[&str] = &["password", "şifre", "parola"];

impl AuthService {
    /// Create users from a CSV/TSV export. Rows that cannot be imported are
    /// reported and skipped; the rest are created.
    pub fn import_users(&self, actor: &Principal, bytes: &[u8]) -> Result<ImportReport, ServiceError> {
        let table = parse_table(bytes)?;
        if table.column_index(USERNAME).is_none() {
            return Err(ImportError::MissingColumn("username".into()).into());
        }

        let mut report = ImportReport::default();
        for row in table.records() {
            // Header is spreadsheet row 1.
            let row_no = row.index() + 2;
            let skip = |reason: String| SkippedRow { row: row_no, reason };

            let Some(username) = row.text(USERNAME) else {
                report.skipped.push(skip("username is empty".into()));
                continue;
            };
            let role = match row.text(ROLE).map(Role::parse) {
                None => None,
                Some(Some(role)) => Some(role),
                Some(None) => {
                    report.skipped.push(skip(format!("unknown role '{}'", row.text(ROLE).unwrap_or_default())));
                    continue;
                }
            };
            let password = match row.text(PASSWORD) {
                Some(p) => p.to_string(),
                None if !self.config.import_password.is_empty() => self.config.import_password.clone(),
                None => {
                    report.skipped.push(skip("password is empty".into()));
                    continue;
                }
            };

            let input = CreateUser {
                username: username.to_string(),
                password,
                display_name: row.text(NAME).map(str::to_string),
                email: row.text(EMAIL).map(str::to_string),
                role,
                department: row.text(DEPARTMENT).map(str::to_string),
                active: Some(true),
            };
            let created = check_password_strength(&input.password)
                .and_then(|_| hash_password(&input.password))
                .and_then(|hash| self.insert_user(input, hash));
            match created {
                Ok(_) => report.created += 1,
                Err(e @ (ServiceError::Validation(_) | ServiceError::Conflict(_))) => {
                    report.skipped.push(skip(e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(created = report.created, skipped = report.skipped.len(), "user import");
        self.activity.record(
            actor,
            Action::Import,
            "user",
            "",
            Some(serde_json::json!({
                "created": report.created,
                "skipped": report.skipped.len(),
            })),
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{admin, memory_service, sqlite_service};
    use crate::model::UserQuery;

    #[test]
    fn imports_turkish_semicolon_export() {
        for svc in [memory_service(), sqlite_service()] {
            let csv = "Kullanıcı Adı;Ad Soyad;Bölüm;Rol;Şifre\n\
                       ayse;Ayşe Yılmaz;Kalite;Yönetici;gizli123\n\
                       mehmet;Mehmet Öz;Üretim;kullanıcı;\n";
            let report = svc.import_users(&admin(), csv.as_bytes()).unwrap();
            assert_eq!(report.created, 2, "{:?}", report.skipped);
            assert!(report.skipped.is_empty());

            let users = svc.list_users(&UserQuery::default()).unwrap();
            let ayse = users.items.iter().find(|u| u.username == "ayse").unwrap();
            assert_eq!(ayse.display_name, "Ayşe Yılmaz");
            assert_eq!(ayse.department, "Kalite");
            assert_eq!(ayse.role, Role::Admin);

            // The row without a password got the configured default.
            assert!(svc.login("mehmet", "degistir").is_ok());
        }
    }

    #[test]
    fn reports_skipped_rows() {
        let svc = memory_service();
        let csv = "username,role,password\n\
                   ali,user,gizli123\n\
                   ,user,gizli123\n\
                   veli,owner,gizli123\n\
                   ali,user,gizli123\n\
                   kisa,user,123\n";
        let report = svc.import_users(&admin(), csv.as_bytes()).unwrap();
        assert_eq!(report.created, 1);
        let rows: Vec<usize> = report.skipped.iter().map(|s| s.row).collect();
        assert_eq!(rows, vec![3, 4, 5, 6]);
        assert!(report.skipped[1].reason.contains("owner"));
    }

    #[test]
    fn missing_username_column_is_rejected() {
        let svc = memory_service();
        let err = svc.import_users(&admin(), b"name,email\nAli,ali@example.com\n").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn import_is_logged() {
        let svc = memory_service();
        svc.import_users(&admin(), b"username,password\nali,gizli123\n").unwrap();
        let entries = svc.activity().list(10, Some("user")).unwrap();
        assert!(entries.iter().any(|e| e.action == Action::Import));
    }
}
