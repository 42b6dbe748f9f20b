use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    BuyerConfirmationEvent,
    EventHandler,
    EventProducer,
    Handler,
    PaymentFailedEvent,
    SellerSaleEvent,
};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub buyer_confirmation_producer: Vec<EventProducer<BuyerConfirmationEvent>>,
    pub seller_sale_producer: Vec<EventProducer<SellerSaleEvent>>,
    pub payment_failed_producer: Vec<EventProducer<PaymentFailedEvent>>,
}

pub struct EventHandlers {
    pub on_buyer_confirmation: Option<EventHandler<BuyerConfirmationEvent>>,
    pub on_seller_sale: Option<EventHandler<SellerSaleEvent>>,
    pub on_payment_failed: Option<EventHandler<PaymentFailedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_buyer_confirmation = hooks.on_buyer_confirmation.map(|f| EventHandler::new(buffer_size, f));
        let on_seller_sale = hooks.on_seller_sale.map(|f| EventHandler::new(buffer_size, f));
        let on_payment_failed = hooks.on_payment_failed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_buyer_confirmation, on_seller_sale, on_payment_failed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_buyer_confirmation {
            result.buyer_confirmation_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_seller_sale {
            result.seller_sale_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_payment_failed {
            result.payment_failed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_buyer_confirmation {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_seller_sale {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_payment_failed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_buyer_confirmation: Option<Handler<BuyerConfirmationEvent>>,
    pub on_seller_sale: Option<Handler<SellerSaleEvent>>,
    pub on_payment_failed: Option<Handler<PaymentFailedEvent>>,
}

impl EventHooks {
    pub fn on_buyer_confirmation<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(BuyerConfirmationEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_buyer_confirmation = Some(Arc::new(f));
        self
    }

    pub fn on_seller_sale<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(SellerSaleEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_seller_sale = Some(Arc::new(f));
        self
    }

    pub fn on_payment_failed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentFailedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_payment_failed = Some(Arc::new(f));
        self
    }
}
