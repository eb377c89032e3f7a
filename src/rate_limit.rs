//! rate_limit.rs
//! Orçamento de chamadas à API Tiny: no máximo N consultas por janela.
//!
//! A espera é separada do consumo de propósito: quando a Tiny sinaliza
//! bloqueio temporário o registro é pulado sem gastar orçamento.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct CallBudget {
    max_calls: u32,
    window: Duration,
    used: u32,
    window_start: Option<Instant>,
}

impl CallBudget {
    pub fn new(max_calls: u32, window: Duration) -> Self {
        CallBudget {
            max_calls,
            window,
            used: 0,
            window_start: None,
        }
    }

    /// Bloqueia até haver espaço na janela atual. Se o orçamento já foi
    /// todo consumido, dorme até o fim da janela e abre uma nova.
    pub async fn wait_for_slot(&mut self) {
        if let Some(start) = self.window_start {
            if start.elapsed() >= self.window {
                // Janela venceu sozinha entre uma chamada e outra.
                self.used = 0;
                self.window_start = None;
            } else if self.used >= self.max_calls {
                log::info!(
                    "⏳ Aguardando {}s pelo limite da API Tiny...",
                    self.window.as_secs()
                );
                sleep_until(start + self.window).await;
                self.used = 0;
                self.window_start = None;
            }
        }
    }

    /// Registra uma consulta na janela atual (a primeira abre a janela).
    pub fn consume(&mut self) {
        if self.window_start.is_none() {
            self.window_start = Some(Instant::now());
        }
        self.used += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn primeiras_chamadas_passam_sem_espera() {
        let mut budget = CallBudget::new(40, Duration::from_secs(60));

        let inicio = Instant::now();
        for _ in 0..40 {
            budget.wait_for_slot().await;
            budget.consume();
        }
        assert_eq!(inicio.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn chamada_41_espera_o_fim_da_janela() {
        let mut budget = CallBudget::new(40, Duration::from_secs(60));

        for _ in 0..40 {
            budget.wait_for_slot().await;
            budget.consume();
        }

        let inicio = Instant::now();
        budget.wait_for_slot().await;
        assert_eq!(inicio.elapsed(), Duration::from_secs(60));

        // A janela nova começa zerada: a chamada seguinte não espera.
        budget.consume();
        let depois = Instant::now();
        budget.wait_for_slot().await;
        assert_eq!(depois.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn janela_vencida_reabre_sem_dormir() {
        let mut budget = CallBudget::new(2, Duration::from_secs(60));

        budget.wait_for_slot().await;
        budget.consume();
        budget.wait_for_slot().await;
        budget.consume();

        tokio::time::advance(Duration::from_secs(61)).await;

        let inicio = Instant::now();
        budget.wait_for_slot().await;
        assert_eq!(inicio.elapsed(), Duration::ZERO);
    }
}
