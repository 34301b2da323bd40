// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIMING UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Medição de tempo das chamadas externas (busca e LLM) de uma execução.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::time::Instant;

/// Timer para medir duração de operações
pub struct ActionTimer {
    start: Instant,
    action_name: String,
}

impl ActionTimer {
    /// Inicia um novo timer para uma ação
    pub fn start(action_name: &str) -> Self {
        Self {
            start: Instant::now(),
            action_name: action_name.to_string(),
        }
    }

    /// Retorna o tempo decorrido em milissegundos
    fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Para o timer e loga (debug) o tempo decorrido
    pub fn stop_and_log(self) -> u128 {
        let elapsed = self.elapsed_ms();
        log::debug!("⏱️  {} completado em {}ms", self.action_name, elapsed);
        elapsed
    }
}

/// Estatísticas agregadas de tempo de uma execução
#[derive(Debug, Clone, Default)]
pub struct TimingStats {
    /// Tempos de busca (ms)
    pub search_times: Vec<u128>,
    /// Tempos de LLM (ms)
    pub llm_times: Vec<u128>,
}

impl TimingStats {
    /// Cria estatísticas zeradas
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiciona um tempo de busca
    pub fn add_search_time(&mut self, ms: u128) {
        self.search_times.push(ms);
    }

    /// Adiciona um tempo de LLM
    pub fn add_llm_time(&mut self, ms: u128) {
        self.llm_times.push(ms);
    }

    fn avg(times: &[u128]) -> f64 {
        if times.is_empty() {
            0.0
        } else {
            times.iter().sum::<u128>() as f64 / times.len() as f64
        }
    }

    /// Média de tempo de busca
    pub fn avg_search_time(&self) -> f64 {
        Self::avg(&self.search_times)
    }

    /// Média de tempo de LLM
    pub fn avg_llm_time(&self) -> f64 {
        Self::avg(&self.llm_times)
    }

    /// Tempo total gasto em chamadas externas
    pub fn total_time(&self) -> u128 {
        self.search_times.iter().sum::<u128>() + self.llm_times.iter().sum::<u128>()
    }

    /// Formata um resumo das estatísticas
    pub fn summary(&self) -> String {
        format!(
            "Timing Stats:\n\
             - Search: {} calls, avg {:.1}ms, total {}ms\n\
             - LLM: {} calls, avg {:.1}ms, total {}ms\n\
             - Total: {}ms",
            self.search_times.len(),
            self.avg_search_time(),
            self.search_times.iter().sum::<u128>(),
            self.llm_times.len(),
            self.avg_llm_time(),
            self.llm_times.iter().sum::<u128>(),
            self.total_time()
        )
    }
}
