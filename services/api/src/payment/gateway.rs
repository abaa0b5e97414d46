//! Payment outcome strategy

use rand::Rng;

use crate::models::PaymentMethod;

/// Outcome of a gateway decision for one payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOutcome {
    Approved,
    Declined,
}

/// Decides whether a payment attempt goes through. Injected into the
/// payment service so tests can replace the randomized simulation.
pub trait PaymentGateway: Send + Sync {
    fn decide(&self, method: PaymentMethod) -> GatewayOutcome;
}

/// Simulated gateway with per-method success odds. Cash is collected
/// in person and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedGateway;

impl PaymentGateway for SimulatedGateway {
    fn decide(&self, method: PaymentMethod) -> GatewayOutcome {
        let success_rate = match method {
            PaymentMethod::Upi => 0.95,
            PaymentMethod::CreditCard | PaymentMethod::DebitCard => 0.92,
            PaymentMethod::NetBanking => 0.90,
            PaymentMethod::Wallet => 0.88,
            PaymentMethod::Cash => return GatewayOutcome::Approved,
        };

        if rand::thread_rng().gen_bool(success_rate) {
            GatewayOutcome::Approved
        } else {
            GatewayOutcome::Declined
        }
    }
}

/// Gateway returning a fixed outcome, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedGateway(pub GatewayOutcome);

impl PaymentGateway for FixedGateway {
    fn decide(&self, _method: PaymentMethod) -> GatewayOutcome {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_gateway_forces_outcome() {
        let approve = FixedGateway(GatewayOutcome::Approved);
        let decline = FixedGateway(GatewayOutcome::Declined);
        for method in [
            PaymentMethod::CreditCard,
            PaymentMethod::Upi,
            PaymentMethod::Cash,
        ] {
            assert_eq!(approve.decide(method), GatewayOutcome::Approved);
            assert_eq!(decline.decide(method), GatewayOutcome::Declined);
        }
    }

    #[test]
    fn simulated_gateway_always_approves_cash() {
        let gateway = SimulatedGateway;
        for _ in 0..1_000 {
            assert_eq!(
                gateway.decide(PaymentMethod::Cash),
                GatewayOutcome::Approved
            );
        }
    }
}
