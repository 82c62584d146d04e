table! {
    sessions (token_hash, user_id, login_time) {
        token_hash -> Char,
        user_id -> Char,
        login_time -> Datetime,
    }
}

table! {
    profiles (id) {
        id -> Char,
        full_name -> Varchar,
        user_type -> Varchar,
    }
}

table! {
    counselor_profiles (id) {
        id -> Char,
        bio -> Text,
        credentials -> Varchar,
        specializations -> Text,
        phone -> Nullable<Varchar>,
        location -> Nullable<Varchar>,
        years_experience -> Nullable<Integer>,
        is_accepting_patients -> Bool,
        approval_status -> Varchar,
        timezone -> Varchar,
        created_at -> Datetime,
    }
}

table! {
    counselor_availability (id) {
        id -> Unsigned<Bigint>,
        counselor_id -> Char,
        day_of_week -> Nullable<Integer>,
        specific_date -> Nullable<Date>,
        start_time -> Time,
        end_time -> Time,
        is_active -> Bool,
    }
}

table! {
    appointments (id) {
        id -> Unsigned<Bigint>,
        counselor_id -> Char,
        user_id -> Char,
        appointment_date -> Date,
        start_time -> Time,
        end_time -> Time,
        status -> Varchar,
        notes -> Nullable<Text>,
        created_at -> Datetime,
        updated_at -> Datetime,
    }
}

allow_tables_to_appear_in_same_query!(
    sessions,
    profiles,
    counselor_profiles,
    counselor_availability,
    appointments,
);
