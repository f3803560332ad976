//! Diesel table definitions.

diesel::table! {
    users (id) {
        id -> Int4,
        discord_id -> Int8,
        tz -> Nullable<Text>,
        email -> Nullable<Text>,
        token_ciphertext -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    guild_settings (id) {
        id -> Int4,
        guild_id -> Int8,
        default_channel_id -> Nullable<Int8>,
        default_tz -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    events (id) {
        id -> Int4,
        user_id -> Int4,
        discord_user_id -> Int8,
        google_event_id -> Text,
        title -> Text,
        description -> Nullable<Text>,
        location -> Nullable<Text>,
        start_at -> Timestamptz,
        end_at -> Timestamptz,
        attendees -> Nullable<Jsonb>,
        html_link -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    reminders (id) {
        id -> Int4,
        user_id -> Int4,
        google_event_id -> Text,
        channel_id -> Nullable<Int8>,
        remind_at -> Timestamptz,
        sent -> Bool,
        retries -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(events -> users (user_id));
diesel::joinable!(reminders -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, guild_settings, events, reminders);
