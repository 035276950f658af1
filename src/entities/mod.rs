pub mod cart;
pub mod category;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod reservation;
pub mod review;
pub mod user;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Schema, Set, TransactionTrait};
use std::sync::Arc;

use crate::entities::{
    cart::Entity as Cart, category::Entity as Category, menu_item::Entity as MenuItem,
    order::Entity as Order, order_item::Entity as OrderItem, reservation::Entity as Reservation,
    review::Entity as Review, user::Entity as User,
};

pub async fn setup_schema(db: &DatabaseConnection) {
    let schema = Schema::new(db.get_database_backend());
    let create_user_table = schema.create_table_from_entity(User);
    let create_category_table = schema.create_table_from_entity(Category);
    let create_menu_item_table = schema.create_table_from_entity(MenuItem);
    let create_cart_table = schema.create_table_from_entity(Cart);
    let create_order_table = schema.create_table_from_entity(Order);
    let create_order_item_table = schema.create_table_from_entity(OrderItem);
    let create_reservation_table = schema.create_table_from_entity(Reservation);
    let create_review_table = schema.create_table_from_entity(Review);

    db.execute(db.get_database_backend().build(&create_user_table))
        .await
        .expect("Failed to create user schema");
    db.execute(db.get_database_backend().build(&create_category_table))
        .await
        .expect("Failed to create category schema");
    db.execute(db.get_database_backend().build(&create_menu_item_table))
        .await
        .expect("Failed to create menu item schema");
    db.execute(db.get_database_backend().build(&create_cart_table))
        .await
        .expect("Failed to create cart schema");
    db.execute(db.get_database_backend().build(&create_order_table))
        .await
        .expect("Failed to create order schema");
    db.execute(db.get_database_backend().build(&create_order_item_table))
        .await
        .expect("Failed to create order item schema");
    db.execute(db.get_database_backend().build(&create_reservation_table))
        .await
        .expect("Failed to create reservation schema");
    db.execute(db.get_database_backend().build(&create_review_table))
        .await
        .expect("Failed to create review schema");
}

/// Seeds the superuser account. Startup-only, panics on failure.
pub async fn primary_setup(db: Arc<DatabaseConnection>) {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password("Kitchen15".as_bytes(), &salt)
        .expect("Failed to hash password")
        .to_string();

    let new_admin = user::ActiveModel {
        username: Set("admin".to_owned()),
        password: Set(password_hash),
        role: Set(user::Role::Admin),
        ..Default::default()
    };

    match db.begin().await {
        Ok(txn) => {
            match user::Entity::insert(new_admin).exec(&txn).await {
                Ok(_) => match txn.commit().await {
                    Ok(_) => {}
                    Err(_) => {
                        panic!("Failed to run primary setup, but function requested.");
                    }
                },
                Err(_) => {
                    let _ = txn.rollback().await;
                    panic!("Failed to run primary setup, but function requested.");
                }
            }
        }
        Err(_) => {
            panic!("Failed to run primary setup, but function requested.");
        }
    }
}
