mod session;
pub use session::{
    SessionUser,
    create_session,
    get_session_user,
    delete_expired_sessions,
};
