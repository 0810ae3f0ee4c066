// router.rs
// Dispatch by HTTP method and path arity only.

use actix_web::web;

use crate::handlers::{
    create_bucket_handler, delete_bucket_handler, delete_object_handler, get_object_handler,
    list_buckets_handler, method_not_allowed, put_object_handler, unsupported_path,
};

/// Registers the façade's routes:
///
/// | Path | Method | Operation |
/// |---|---|---|
/// | `/` | GET | list buckets |
/// | `/{bucket}` | PUT | create bucket |
/// | `/{bucket}` | DELETE | delete bucket |
/// | `/{bucket}/{object}` | PUT | upload object |
/// | `/{bucket}/{object}` | GET | download object |
/// | `/{bucket}/{object}` | DELETE | delete object |
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .get(list_buckets_handler)
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/{bucket}")
            .put(create_bucket_handler)
            .delete(delete_bucket_handler)
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/{bucket}/{object}")
            .put(put_object_handler)
            .get(get_object_handler)
            .delete(delete_object_handler)
            .default_service(web::to(method_not_allowed)),
    )
    .default_service(web::to(unsupported_path));
}
