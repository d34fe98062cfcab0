use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_student, delete_student, get_student, get_student_by_number, get_student_specialty,
    get_students, get_students_by_specialty, replace_student, update_student,
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_students).post(create_student))
        .route(
            "/{id}",
            get(get_student)
                .put(replace_student)
                .patch(update_student)
                .delete(delete_student),
        )
        .route("/{id}/specialty", get(get_student_specialty))
        .route("/number/{student_number}", get(get_student_by_number))
        .route("/specialty/{specialty_id}", get(get_students_by_specialty))
}
