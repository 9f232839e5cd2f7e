//! Compiled-in navigation descriptor.
//!
//! Which of these a session actually sees is decided by the access filter;
//! this list only declares what exists and which module key gates each entry.

use staffroom_auth::{MenuItem, PROFILE_MODULE};

/// Full portal menu in display order.
pub fn portal_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("/profile", "My Profile", PROFILE_MODULE),
        MenuItem::new("/students", "Students", "students"),
        MenuItem::new("/admissions", "Admissions", "admissions"),
        MenuItem::new("/fees", "Fee Collection", "fees"),
        MenuItem::new("/payroll", "Payroll", "payroll"),
        MenuItem::new("/transport", "Transport", "transport"),
        MenuItem::new("/library", "Library", "library"),
        MenuItem::new("/documents", "Documents", "documents"),
        MenuItem::new("/reports", "Reports", "reports"),
        MenuItem::new("/settings", "Settings", "settings"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn profile_entry_is_present_exactly_once() {
        let count = portal_menu()
            .iter()
            .filter(|item| item.module.as_str() == PROFILE_MODULE)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn module_keys_are_unique() {
        let menu = portal_menu();
        let keys: HashSet<_> = menu.iter().map(|item| item.module.as_str()).collect();
        assert_eq!(keys.len(), menu.len());
    }

    #[test]
    fn paths_are_unique_and_absolute() {
        let menu = portal_menu();
        let paths: HashSet<_> = menu.iter().map(|item| item.path.as_ref()).collect();
        assert_eq!(paths.len(), menu.len());
        assert!(menu.iter().all(|item| item.path.starts_with('/')));
    }
}
