/*
 * Responsibility
 * - In-memory employee records behind the protected /employees routes
 * - Cheap to clone (shared Arc<RwLock<..>> inside)
 */
use std::sync::Arc;

use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub id: u32,
    pub name: String,
    pub position: String,
    pub department: String,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeRepo {
    rows: Arc<RwLock<Vec<EmployeeRow>>>,
}

impl EmployeeRepo {
    pub fn new(rows: Vec<EmployeeRow>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    pub fn seeded() -> Self {
        let row = |id, name: &str, position: &str, department: &str| EmployeeRow {
            id,
            name: name.to_string(),
            position: position.to_string(),
            department: department.to_string(),
        };

        Self::new(vec![
            row(1, "John Doe", "Developer", "IT"),
            row(2, "Jane Smith", "Manager", "HR"),
            row(3, "Bob Johnson", "Analyst", "Finance"),
        ])
    }

    pub async fn list(&self) -> Vec<EmployeeRow> {
        self.rows.read().await.clone()
    }

    pub async fn get(&self, id: u32) -> Option<EmployeeRow> {
        self.rows.read().await.iter().find(|e| e.id == id).cloned()
    }

    pub async fn create(&self, name: &str, position: &str, department: &str) -> EmployeeRow {
        let mut rows = self.rows.write().await;
        let id = rows.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let row = EmployeeRow {
            id,
            name: name.to_string(),
            position: position.to_string(),
            department: department.to_string(),
        };
        rows.push(row.clone());
        row
    }

    /// `None` fields are left as they are. Returns `None` when the id is unknown.
    pub async fn update(
        &self,
        id: u32,
        name: Option<&str>,
        position: Option<&str>,
        department: Option<&str>,
    ) -> Option<EmployeeRow> {
        let mut rows = self.rows.write().await;
        let row = rows.iter_mut().find(|e| e.id == id)?;

        if let Some(name) = name {
            row.name = name.to_string();
        }
        if let Some(position) = position {
            row.position = position.to_string();
        }
        if let Some(department) = department {
            row.department = department.to_string();
        }

        Some(row.clone())
    }

    pub async fn delete(&self, id: u32) -> bool {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|e| e.id != id);
        rows.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_takes_next_id() {
        let repo = EmployeeRepo::seeded();

        let row = repo.create("Ada", "Engineer", "R&D").await;

        assert_eq!(row.id, 4);
        assert_eq!(repo.get(4).await, Some(row));
        assert_eq!(EmployeeRepo::default().create("A", "B", "C").await.id, 1);
    }

    #[tokio::test]
    async fn update_touches_only_given_fields() {
        let repo = EmployeeRepo::seeded();

        let row = repo.update(2, None, Some("Director"), None).await.unwrap();

        assert_eq!(row.name, "Jane Smith");
        assert_eq!(row.position, "Director");
        assert!(repo.update(99, Some("x"), None, None).await.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_went() {
        let repo = EmployeeRepo::seeded();

        assert!(repo.delete(1).await);
        assert!(!repo.delete(1).await);
        assert_eq!(repo.list().await.len(), 2);
    }
}
