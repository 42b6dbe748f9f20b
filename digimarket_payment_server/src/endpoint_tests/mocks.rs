use digimarket_payment_engine::{
    db_types::{NewOrder, NewPayment, Order, OrderId, OrderItem, Payment, Product, SellerLedger},
    helpers::FeeSplit,
    traits::{
        GatewayError,
        GatewayVerdict,
        HostedCharge,
        InitializeCharge,
        LedgerDatabase,
        LedgerError,
        PaymentGateway,
    },
};
use mockall::mock;
use serde_json::Value;

mock! {
    pub LedgerDb {}
    impl LedgerDatabase for LedgerDb {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), LedgerError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, LedgerError>;
        async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, LedgerError>;
        async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, LedgerError>;
        async fn insert_payment(&self, payment: NewPayment) -> Result<(Payment, bool), LedgerError>;
        async fn fetch_payment_by_reference(&self, reference: &str) -> Result<Option<Payment>, LedgerError>;
        async fn fetch_payment_by_id(&self, id: i64) -> Result<Option<Payment>, LedgerError>;
        async fn fetch_pending_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, LedgerError>;
        async fn store_hosted_checkout(&self, reference: &str, authorization_url: &str, access_code: &str) -> Result<Payment, LedgerError>;
        async fn settle_payment(&self, reference: &str, gateway_tx_id: Option<String>, raw_payload: &Value) -> Result<Option<Payment>, LedgerError>;
        async fn fail_payment(&self, reference: &str, reason: &str) -> Result<Option<Payment>, LedgerError>;
        async fn refund_payment(&self, reference: &str) -> Result<Option<Payment>, LedgerError>;
        async fn mark_order_paid(&self, id: i64) -> Result<Order, LedgerError>;
        async fn mark_order_payment_failed(&self, id: i64) -> Result<Order, LedgerError>;
        async fn mark_order_refunded(&self, id: i64) -> Result<Order, LedgerError>;
        async fn cancel_order(&self, id: i64) -> Result<Option<Order>, LedgerError>;
        async fn credit_order_line(&self, item: &OrderItem, split: FeeSplit) -> Result<bool, LedgerError>;
        async fn fetch_unfulfilled_paid_references(&self) -> Result<Vec<String>, LedgerError>;
        async fn fetch_product(&self, id: i64) -> Result<Option<Product>, LedgerError>;
        async fn fetch_seller_ledger(&self, seller_id: &str) -> Result<Option<SellerLedger>, LedgerError>;
        async fn close(&mut self) -> Result<(), LedgerError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn initialize_charge(&self, charge: InitializeCharge) -> Result<HostedCharge, GatewayError>;
        async fn verify_by_reference(&self, reference: &str) -> Result<GatewayVerdict, GatewayError>;
        async fn refund(&self, reference: &str) -> Result<(), GatewayError>;
    }
}
