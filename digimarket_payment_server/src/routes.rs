//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the storage backend and the payment gateway so that endpoint tests can substitute
//! mocks for both.
use actix_web::{get, web, HttpResponse, Responder};
use digimarket_payment_engine::{
    db_types::OrderId,
    traits::{LedgerDatabase, PaymentGateway},
    ReconcilerApi,
    ReconcilerError,
};
use log::*;

use crate::{
    auth::JwtClaims,
    data_objects::{PaymentInitiated, RefundParams},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Verify  ----------------------------------------------------
route!(verify_payment => Get "/payments/verify/{reference}" impl LedgerDatabase, PaymentGateway);
/// Route handler for the payment verification endpoint
///
/// Buyers land here after the hosted checkout redirects back to the store. The handler forces a live verify call
/// against the gateway and reconciles the result, so the buyer sees the settled state even if the corresponding
/// webhook has not arrived (or never will). Safe to call any number of times.
///
/// Requires a bearer token; only the buyer who initiated the payment may query it.
pub async fn verify_payment<B, G>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<ReconcilerApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase,
    G: PaymentGateway,
{
    let reference = path.into_inner();
    debug!("💻️ GET verify payment [{reference}] for user {}", claims.sub);
    let payment = api
        .payment_by_reference(&reference)
        .await?
        .ok_or_else(|| ReconcilerError::UnknownReference(reference.clone()))?;
    if payment.user_id != claims.sub {
        return Err(ReconcilerError::NotPaymentOwner.into());
    }
    let result = api.reconcile(&reference, None).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Pay  ----------------------------------------------------
route!(pay_order => Post "/orders/{order_id}/pay" impl LedgerDatabase, PaymentGateway);
/// Route handler for initiating payment on an order
///
/// Returns the payment reference and the gateway's hosted checkout URL. Calling it again while an attempt is
/// still live returns the same reference and checkout rather than starting a second charge.
pub async fn pay_order<B, G>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<ReconcilerApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase,
    G: PaymentGateway,
{
    let order_id = OrderId(path.into_inner());
    debug!("💻️ POST pay order [{order_id}] for user {}", claims.sub);
    let (payment, hosted) = api.initiate_payment(&order_id, &claims.sub, &claims.email).await?;
    let body = PaymentInitiated { reference: payment.reference, authorization_url: hosted.authorization_url };
    Ok(HttpResponse::Ok().json(body))
}

//----------------------------------------------   Refund  ----------------------------------------------------
route!(refund_payment => Post "/payments/{id}/refund" impl LedgerDatabase, PaymentGateway);
/// Route handler for buyer-initiated refunds
///
/// Only the payer may request one, only on a successful payment, and only inside the refund window. The gateway
/// is asked first; the ledger follows.
pub async fn refund_payment<B, G>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<RefundParams>,
    api: web::Data<ReconcilerApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase,
    G: PaymentGateway,
{
    let payment_id = path.into_inner();
    debug!("💻️ POST refund payment #{payment_id} for user {}", claims.sub);
    let (order, payment) = api.request_refund(payment_id, &claims.sub, body.into_inner().reason).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "order": order, "payment": payment })))
}
