mod group;
pub use group::{
    User,
    Group,
    GROUP_MODE_ALL,
    GROUP_MODE_SPECIFIC,
    create_user,
    get_user_by_id,
    set_user_group,
    create_group,
    get_group_by_id,
    add_group_model,
    list_group_model_ids,
};
