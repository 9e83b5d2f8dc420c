//! Collapse duplicate user accounts into one record per person.
//!
//! The backend can return several accounts for the same person, typically a
//! seeded placeholder plus a later provisioned login. Records are grouped by
//! lower-cased email (or id when the email is empty) and one survivor is
//! picked per group.

use std::collections::HashMap;

use super::User;
use super::sorting::sort_by_name;

/// Usernames created by the organization seeding script.
pub const SYSTEM_SEED_USERNAMES: &[&str] = &[
    "admin",
    "md",
    "gm.ict",
    "gm.hr",
    "gm.finance",
    "agm.software",
    "pm.lpc",
];

/// Prefix of placeholder usernames generated for seeded staff records.
pub const PLACEHOLDER_USERNAME_PREFIX: &str = "user-";

/// Grouping key: lower-cased email, or lower-cased id when email is empty.
pub fn dedup_key(user: &User) -> String {
    let email = user.email.trim();
    if email.is_empty() {
        user.id.to_lowercase()
    } else {
        email.to_lowercase()
    }
}

/// Whether `user` is the authoritative record for its person.
///
/// # Examples
/// ```
/// use org_sync::domain::{User, is_canonical};
///
/// let mut user = User {
///     id: "u-1".to_owned(),
///     username: Some("user-17".to_owned()),
///     name: "Jane Doe".to_owned(),
///     email: "j.doe@example.com".to_owned(),
///     employee_id: String::new(),
///     grade_level: String::new(),
///     role_name: String::new(),
///     directorate_id: None,
///     division_id: None,
///     department_id: None,
///     is_active: true,
///     is_superuser: false,
/// };
/// assert!(is_canonical(&user));
/// user.username = Some("jdoe".to_owned());
/// assert!(!is_canonical(&user));
/// ```
pub fn is_canonical(user: &User) -> bool {
    match user.username.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(username) => {
            SYSTEM_SEED_USERNAMES.contains(&username)
                || username.starts_with(PLACEHOLDER_USERNAME_PREFIX)
        }
    }
}

/// Completeness score: 2 for a division, 1 for a department, 1 for a role.
pub fn detail_score(user: &User) -> u8 {
    let division = if user.division_id.is_some() { 2 } else { 0 };
    let department = u8::from(user.department_id.is_some());
    let role = u8::from(!user.role_name.is_empty());
    division + department + role
}

fn outranks(candidate: &User, incumbent: &User) -> bool {
    match (is_canonical(candidate), is_canonical(incumbent)) {
        (true, false) => true,
        (false, true) => false,
        _ => detail_score(candidate) > detail_score(incumbent),
    }
}

/// Keep one user per [`dedup_key`], returning the survivors sorted by name.
///
/// A canonical record beats a non-canonical one; otherwise the higher
/// [`detail_score`] wins and ties keep the first record seen. Running the
/// function on its own output changes nothing.
pub fn dedupe_users(users: Vec<User>) -> Vec<User> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(users.len());
    let mut survivors: Vec<User> = Vec::with_capacity(users.len());

    for user in users {
        let key = dedup_key(&user);
        match slots.get(&key).copied() {
            Some(slot) => {
                if let Some(incumbent) = survivors.get_mut(slot) {
                    if outranks(&user, incumbent) {
                        *incumbent = user;
                    }
                }
            }
            None => {
                slots.insert(key, survivors.len());
                survivors.push(user);
            }
        }
    }

    sort_by_name(&mut survivors);
    survivors
}

#[cfg(test)]
mod tests {
    //! Coverage for duplicate resolution.

    use std::collections::HashSet;

    use super::*;
    use rstest::{fixture, rstest};

    fn user(id: &str, username: Option<&str>, email: &str) -> User {
        User {
            id: id.to_owned(),
            username: username.map(str::to_owned),
            name: format!("Person {id}"),
            email: email.to_owned(),
            employee_id: String::new(),
            grade_level: String::new(),
            role_name: String::new(),
            directorate_id: None,
            division_id: None,
            department_id: None,
            is_active: true,
            is_superuser: false,
        }
    }

    #[fixture]
    fn mixed_users() -> Vec<User> {
        let mut seeded = user("u-1", Some("user-17"), "J.Doe@example.com");
        seeded.division_id = Some("D1".to_owned());
        let mut admin = user("u-4", Some("admin"), "");
        admin.role_name = "Administrator".to_owned();
        vec![
            user("u-2", Some("jdoe"), "j.doe@example.com"),
            seeded,
            user("u-3", None, "ops@example.com"),
            admin,
            user("U-4", Some("admin2"), ""),
            user("u-5", Some("ops"), "OPS@example.com"),
        ]
    }

    #[rstest]
    fn output_keys_are_unique(mixed_users: Vec<User>) {
        let deduped = dedupe_users(mixed_users);
        let keys = deduped.iter().map(dedup_key).collect::<HashSet<_>>();
        assert_eq!(keys.len(), deduped.len());
        assert_eq!(deduped.len(), 3);
    }

    #[rstest]
    fn dedupe_is_idempotent(mixed_users: Vec<User>) {
        let once = dedupe_users(mixed_users);
        let twice = dedupe_users(once.clone());
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case::placeholder_first(true)]
    #[case::placeholder_last(false)]
    fn placeholder_record_wins_regardless_of_order(#[case] placeholder_first: bool) {
        let placeholder = user("u-1", Some("user-17"), "j.doe@example.com");
        let provisioned = user("u-2", Some("jdoe"), "j.doe@example.com");
        let input = if placeholder_first {
            vec![placeholder, provisioned]
        } else {
            vec![provisioned, placeholder]
        };

        let deduped = dedupe_users(input);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped.first().map(|kept| kept.id.as_str()), Some("u-1"));
    }

    #[rstest]
    fn division_breaks_ties_between_canonical_records() {
        let bare = user("u-1", None, "a@example.com");
        let mut detailed = user("u-2", Some("user-2"), "a@example.com");
        detailed.division_id = Some("D1".to_owned());

        let deduped = dedupe_users(vec![bare, detailed]);
        assert_eq!(deduped.first().map(|kept| kept.id.as_str()), Some("u-2"));
    }

    #[rstest]
    fn equal_scores_keep_first_seen() {
        let first = user("u-1", Some("alpha"), "a@example.com");
        let second = user("u-2", Some("beta"), "a@example.com");
        let deduped = dedupe_users(vec![first, second]);
        assert_eq!(deduped.first().map(|kept| kept.id.as_str()), Some("u-1"));
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(""), true)]
    #[case(Some("md"), true)]
    #[case(Some("user-9"), true)]
    #[case(Some("jdoe"), false)]
    fn canonical_predicate(#[case] username: Option<&str>, #[case] expected: bool) {
        assert_eq!(is_canonical(&user("u", username, "")), expected);
    }

    #[rstest]
    fn detail_score_weights_division_double() {
        let mut scored = user("u", None, "");
        scored.division_id = Some("D".to_owned());
        scored.department_id = Some("P".to_owned());
        scored.role_name = "Officer".to_owned();
        assert_eq!(detail_score(&scored), 4);
    }

    #[rstest]
    fn output_is_sorted_by_name() {
        let mut zed = user("u-1", None, "z@example.com");
        zed.name = "Zed".to_owned();
        let mut amy = user("u-2", None, "a@example.com");
        amy.name = "amy".to_owned();
        let mut bola = user("u-3", None, "b@example.com");
        bola.name = "Bola".to_owned();
        let names = dedupe_users(vec![zed, bola, amy])
            .into_iter()
            .map(|kept| kept.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["amy", "Bola", "Zed"]);
    }
}
