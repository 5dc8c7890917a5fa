//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When
//! migrations change, regenerate with `diesel print-schema` or update by hand.

diesel::table! {
    /// User accounts created on first GitHub login.
    users (id) {
        id -> Uuid,
        /// GitHub numeric account id (unique).
        github_id -> Int8,
        username -> Varchar,
        email -> Nullable<Varchar>,
        avatar_url -> Nullable<Text>,
        /// Latest OAuth access token.
        access_token -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One claim per user, one user per label.
    subdomain_claims (id) {
        id -> Uuid,
        user_id -> Uuid,
        subdomain_name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Record intents. `is_active` is true exactly when
    /// `remote_record_id` is set (CHECK constraint).
    records (id) {
        id -> Uuid,
        user_id -> Uuid,
        record_name -> Varchar,
        record_type -> Varchar,
        record_value -> Text,
        ttl -> Int4,
        is_active -> Bool,
        remote_record_id -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(subdomain_claims -> users (user_id));
diesel::joinable!(records -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(records, subdomain_claims, users);
