use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api")
                .service(web::resource("/users").route(web::get().to(handlers::get_all_users)))
                .service(
                    web::resource("/book/{book_id}/in_use")
                        .route(web::get().to(handlers::is_book_in_use)),
                )
                .service(
                    web::scope("/user")
                        .service(web::resource("").route(web::post().to(handlers::add_user)))
                        .service(
                            web::scope("/{user_id}")
                                .service(web::resource("").route(web::get().to(handlers::get_user)))
                                .service(
                                    web::resource("/borrows")
                                        .route(web::get().to(handlers::get_active_borrows)),
                                )
                                .service(
                                    web::resource("/history")
                                        .route(web::get().to(handlers::get_borrow_history)),
                                )
                                .service(
                                    web::resource("/review")
                                        .route(web::post().to(handlers::add_review)),
                                )
                                .service(
                                    web::resource("/reviews")
                                        .route(web::get().to(handlers::get_reviews)),
                                )
                                .service(
                                    web::resource("/borrow/{book_id}")
                                        .route(web::post().to(handlers::borrow_book))
                                        .route(web::delete().to(handlers::return_book)),
                                ),
                        ),
                ),
        );
}
