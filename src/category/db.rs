//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
    user::UserID,
};

/// The categories created for every new user, as (name, is_income) pairs.
pub(crate) const DEFAULT_CATEGORIES: &[(&str, bool)] =
    &[("Groceries", false), ("Rent", false), ("Salary", true)];

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            is_income INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            UNIQUE(name, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
/// This function will return an:
/// - [Error::DuplicateCategoryName] if the user already has a category called `name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: CategoryName,
    is_income: bool,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, user_id, is_income) VALUES (?1, ?2, ?3)",
            (name.as_ref(), user_id.as_i64(), is_income),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        user_id,
        is_income,
    })
}

/// Create the default categories for a newly registered user.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn create_default_categories(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    for (name, is_income) in DEFAULT_CATEGORIES {
        create_category(
            CategoryName::new_unchecked(name),
            *is_income,
            user_id,
            connection,
        )?;
    }

    Ok(())
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the category does not exist or belongs to
/// another user.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, name, user_id, is_income FROM category
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_category_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's categories ordered alphabetically by name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, user_id, is_income FROM category
             WHERE user_id = :user_id ORDER BY name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update a category's name and income flag.
///
/// # Errors
/// This function will return an:
/// - [Error::UpdateMissingCategory] if the category does not exist or belongs
///   to another user,
/// - [Error::DuplicateCategoryName] if the user already has another category
///   called `name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_category(
    category_id: CategoryId,
    user_id: UserID,
    name: CategoryName,
    is_income: bool,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, is_income = ?2 WHERE id = ?3 AND user_id = ?4",
            (name.as_ref(), is_income, category_id, user_id.as_i64()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string()),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category owned by `user_id`.
///
/// Transactions that referenced the category are left in place with their
/// category cleared by the foreign key's SET NULL action; budgets for the
/// category are deleted by their CASCADE action.
///
/// # Errors
/// Returns an [Error::DeleteMissingCategory] if the category does not exist
/// or belongs to another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let user_id = UserID::new(row.get(2)?);
    let is_income = row.get(3)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        user_id,
        is_income,
    })
}

#[cfg(test)]
mod category_query_tests {
    use crate::{
        Error,
        category::{
            CategoryName, create_category, delete_category, get_categories, get_category,
            update_category,
        },
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{DEFAULT_CATEGORIES, create_default_categories};

    #[test]
    fn create_category_succeeds() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let name = CategoryName::new("Categorically a category").unwrap();

        let category = create_category(name.clone(), false, user.id, &conn)
            .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, name);
        assert_eq!(category.user_id, user.id);
        assert!(!category.is_income);
    }

    #[test]
    fn create_category_fails_on_duplicate_name_for_same_user() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();

        let result = create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn);

        assert_eq!(
            result,
            Err(Error::DuplicateCategoryName("Food".to_string()))
        );
    }

    #[test]
    fn create_category_succeeds_on_same_name_for_other_user() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let other_user = insert_test_user(&conn);
        create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();

        let result = create_category(
            CategoryName::new_unchecked("Food"),
            false,
            other_user.id,
            &conn,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn get_category_does_not_leak_other_users_categories() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let other_user = insert_test_user(&conn);
        let category =
            create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();

        let result = get_category(category.id, other_user.id, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_categories_returns_only_own_categories_sorted_by_name() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let other_user = insert_test_user(&conn);
        create_category(CategoryName::new_unchecked("Zoo"), false, user.id, &conn).unwrap();
        create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();
        create_category(
            CategoryName::new_unchecked("Other persons"),
            false,
            other_user.id,
            &conn,
        )
        .unwrap();

        let categories = get_categories(user.id, &conn).unwrap();

        let names: Vec<&str> = categories
            .iter()
            .map(|category| category.name.as_ref())
            .collect();
        assert_eq!(names, ["Food", "Zoo"]);
    }

    #[test]
    fn update_category_succeeds() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let category =
            create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();

        update_category(
            category.id,
            user.id,
            CategoryName::new_unchecked("Dining"),
            true,
            &conn,
        )
        .expect("Could not update category");

        let updated = get_category(category.id, user.id, &conn).unwrap();
        assert_eq!(updated.name.as_ref(), "Dining");
        assert!(updated.is_income);
    }

    #[test]
    fn update_category_fails_for_other_users_category() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let other_user = insert_test_user(&conn);
        let category =
            create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();

        let result = update_category(
            category.id,
            other_user.id,
            CategoryName::new_unchecked("Hijacked"),
            false,
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingCategory));
    }

    #[test]
    fn delete_category_succeeds() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let category =
            create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();

        delete_category(category.id, user.id, &conn).expect("Could not delete category");

        assert_eq!(
            get_category(category.id, user.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_category_fails_with_invalid_id() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);

        let result = delete_category(999999, user.id, &conn);

        assert_eq!(result, Err(Error::DeleteMissingCategory));
    }

    #[test]
    fn default_categories_are_created_per_user() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);

        create_default_categories(user.id, &conn).expect("Could not create default categories");

        let categories = get_categories(user.id, &conn).unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        assert!(
            categories
                .iter()
                .any(|category| category.name.as_ref() == "Salary" && category.is_income)
        );
    }
}
